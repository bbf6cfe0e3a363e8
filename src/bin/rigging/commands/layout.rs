//! `rigging layout` command

use anyhow::Result;

use crate::cli::LayoutArgs;
use rigging::ops::{load_recipe, LoadOptions};
use rigging::util::fs::relative_path;
use rigging::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, load: &LoadOptions, args: LayoutArgs) -> Result<()> {
    let loaded = load_recipe(ctx, load)?;
    let mut eval = loaded.evaluation();
    let version = eval.resolve_version().version().map(ToString::to_string);
    let layout = eval.plan_layout()?;

    if args.json {
        let out = serde_json::json!({
            "name": loaded.recipe.name(),
            "version": version,
            "multi_config": layout.is_multi_config(),
            "layout": layout,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let root = loaded.recipe.root();
    let show = |path: &std::path::Path| {
        let rel = relative_path(root, path);
        if rel.as_os_str().is_empty() {
            ".".to_string()
        } else {
            rel.display().to_string()
        }
    };

    println!("settings    {}", layout.settings);
    println!("source      {}", show(&layout.source_dir));
    println!("build       {}", show(&layout.build_dir));
    println!("generators  {}", show(&layout.generators_dir));
    println!("package     {}", show(&layout.package_dir));
    Ok(())
}
