//! `rigging version` command

use anyhow::Result;

use rigging::ops::{load_recipe, LoadOptions};
use rigging::util::GlobalContext;

pub fn execute(ctx: &GlobalContext, load: &LoadOptions) -> Result<()> {
    let loaded = load_recipe(ctx, load)?;
    let mut eval = loaded.evaluation();

    // Unresolved versions print as `unknown (<reason>)` and still exit 0.
    println!("{}", eval.resolve_version());
    Ok(())
}
