//! `rigging clean` command

use anyhow::Result;

use crate::cli::CleanArgs;
use rigging::ops::{clean, load_recipe, LoadOptions};
use rigging::util::shell::Status;
use rigging::util::{GlobalContext, Shell};

pub fn execute(
    ctx: &GlobalContext,
    load: &LoadOptions,
    args: CleanArgs,
    shell: &Shell,
) -> Result<()> {
    let loaded = load_recipe(ctx, load)?;

    let removed = clean(&loaded.recipe, args.all)?;
    if removed.is_empty() {
        shell.status(Status::Fresh, "nothing to clean");
    }
    for dir in removed {
        shell.status(Status::Removed, dir.display());
    }
    Ok(())
}
