use crate::{
    InitArgs,
    config::{DEFAULT_CONFIG_FILE, PublishConfig},
};

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.is_dir() {
        return Err(anyhow::anyhow!(
            "Directory does not exist: {path}",
            path = path.display()
        ));
    }

    let config_file = path.join(DEFAULT_CONFIG_FILE);
    if config_file.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "{config_file} already exists (use --force to overwrite)",
            config_file = config_file.display()
        ));
    }

    let config_text = serde_yaml::to_string(&PublishConfig::default())?;
    tokio::fs::write(&config_file, config_text).await?;

    println!(
        "Created config file {config_file}",
        config_file = config_file.display()
    );

    Ok(())
}
