//! `stencil controller`: generate a controller with its actions.

use tracing::instrument;

use stencil_core::prelude::*;

use crate::{
    cli::{ControllerArgs, GlobalArgs},
    commands::generate::Session,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(name = %args.name))]
pub fn execute(
    args: ControllerArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let session = Session::open(config)?;
    let mut builder = session.env.build();
    // controllers share the class defaults
    let defaults = session.defaults(&args.generate, "class")?;
    session.apply(&mut builder, &args.generate, defaults);

    plan(&mut builder, &args)?;
    session.run(&mut builder, &args.generate, &global, &output)
}

pub(crate) fn plan(builder: &mut Builder, args: &ControllerArgs) -> CliResult<()> {
    builder.add_task("controller", Some(&args.name))?;
    if let Some(parent) = &args.extend {
        builder.call("extend", &[Literal::from(parent.as_str())])?;
    }
    if let Some(actions) = &args.actions {
        builder.call("actions", &[Literal::from(actions.as_str())])?;
    }
    if args.blank {
        builder.call("blank", &[])?;
    }
    if let Some(template) = &args.generate.template {
        builder.call("template", &[Literal::from(template.as_str())])?;
    }
    Ok(())
}
