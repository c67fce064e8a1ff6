use std::path::Path;

use bigsi_config::ConfigRecord;

use super::Error;

pub fn run(config_path: &Path, json: bool) -> Result<(), Error> {
    let config = ConfigRecord::load(config_path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("config file       {:?}", config.config_file_path);
    println!("watch directory   {:?}", config.watch_directory);
    println!("index directory   {:?}", config.index_directory);
    println!(
        "pid               {}",
        config
            .pid
            .map(|pid| pid.to_string())
            .unwrap_or_else(|| "-".to_string())
    );
    println!("running           {}", config.running);
    println!("workers           {}", config.workers);
    println!("kmer size         {}", config.kmer_size);
    println!("log level         {}", config.log_level);
    Ok(())
}
