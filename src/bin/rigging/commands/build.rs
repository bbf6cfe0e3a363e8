//! `rigging build` command

use anyhow::Result;

use crate::cli::BuildArgs;
use rigging::builder::SystemRunner;
use rigging::ops::{build, BuildOptions, LoadOptions};
use rigging::util::shell::{format_duration, Status};
use rigging::util::{GlobalContext, Shell};

pub fn execute(
    ctx: &GlobalContext,
    load: LoadOptions,
    args: BuildArgs,
    shell: &Shell,
) -> Result<()> {
    let opts = BuildOptions {
        load,
        jobs: args.jobs,
    };

    let spinner = shell.spinner(Status::Building, "recipe");
    let result = build(ctx, &opts, &SystemRunner);
    let elapsed = spinner.finish();
    let eval = result?;

    let version = eval
        .version()
        .map(|v| format!(" v{}", v))
        .unwrap_or_default();
    let dir = eval
        .layout()
        .map(|l| l.build_dir.display().to_string())
        .unwrap_or_default();

    shell.status(
        Status::Finished,
        format!(
            "`{}`{} in {} ({})",
            eval.recipe().name(),
            version,
            format_duration(elapsed),
            dir
        ),
    );
    Ok(())
}
