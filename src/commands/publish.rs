use anyhow::Context;

use crate::{
    PublishArgs,
    config::{FailurePolicy, PublishConfig},
    convert,
    git::Workspace,
    publish::{Procedure, PublishContext},
};

pub async fn run(args: &PublishArgs) -> Result<(), anyhow::Error> {
    let mut config = PublishConfig::load_from_arg(args.config_file.as_deref())?;

    // Command line flags override the config file
    if args.restore_on_failure {
        config.on_failure = FailurePolicy::Restore;
    }
    if let Some(kind) = args.converter {
        config.converter.kind = kind;
    }

    let procedure = Procedure::default_procedure(config.on_failure);

    if args.dry_run {
        println!(
            "Would publish {} from '{}' to {} on '{}':",
            config.document.display(),
            config.main_branch,
            config.output.display(),
            config.publish_branch
        );
        for (position, name) in procedure.step_names().iter().enumerate() {
            println!("  {}. {}", position + 1, name);
        }
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let workspace = Workspace::discover(&cwd)?;
    tracing::debug!("publishing from {}", workspace.work_tree().display());

    let output = config.output.clone();
    let publish_branch = config.publish_branch.clone();

    // git2 and the converter block, keep them off the async workers
    let report = tokio::task::spawn_blocking(move || {
        let converter = convert::from_config(&config.converter);
        let mut ctx = PublishContext::new(&workspace, &config, converter.as_ref());
        procedure.run(&mut ctx)
    })
    .await
    .context("publish task panicked")??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Published {} to {} ({} bytes, commit {})",
            output.display(),
            publish_branch,
            report.page_bytes.unwrap_or_default(),
            report.commit.as_deref().unwrap_or("none"),
        );
    }

    Ok(())
}
