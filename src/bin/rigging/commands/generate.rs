//! `rigging generate` command

use anyhow::Result;

use rigging::ops::{load_recipe, LoadOptions};
use rigging::util::fs::relative_path;
use rigging::util::shell::Status;
use rigging::util::{GlobalContext, Shell};

pub fn execute(ctx: &GlobalContext, load: &LoadOptions, shell: &Shell) -> Result<()> {
    let loaded = load_recipe(ctx, load)?;
    let mut eval = loaded.evaluation();

    shell.status(
        Status::Resolving,
        format!("`{}` {}", loaded.recipe.name(), eval.resolve_version()),
    );
    eval.plan_layout()?;
    eval.create_dirs()?;

    for artifact in eval.generate()? {
        shell.status(
            Status::Generated,
            format!(
                "{} {}",
                artifact.kind(),
                relative_path(loaded.recipe.root(), artifact.path()).display()
            ),
        );
    }
    Ok(())
}
