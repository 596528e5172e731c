use anyhow::Result;
use dita_core::cache::CacheStorage;
use dita_core::config::DitaConfig;

pub fn run(config: &DitaConfig) -> Result<()> {
    println!("Config file:  {}", DitaConfig::config_path()?.display());
    println!("Cache dir:    {}", CacheStorage::default_root()?.display());
    println!("Cache name:   {}", config.worker.cache_name);

    match &config.dataset {
        Some(path) => println!("Dataset:      {}", path.display()),
        None => println!("Dataset:      built-in"),
    }

    Ok(())
}
