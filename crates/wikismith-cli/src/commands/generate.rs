//! `wikismith generate-config` - write a sample configuration file

use super::AppConfig;
use anyhow::Context;
use colored::Colorize;

/// Write a commented sample configuration to `output`.
pub fn run(output: &str) -> anyhow::Result<()> {
    let config = AppConfig::default();
    let yaml = serde_yaml::to_string(&config).context("failed to serialize sample config")?;

    let content = format!(
        "# Wikismith configuration.\n\
         # ${{VAR}} references are substituted from the environment at load time;\n\
         # WIKISMITH_-prefixed variables override file values (e.g. WIKISMITH_LLM__API_KEY).\n\
         {yaml}"
    );
    std::fs::write(output, content)
        .with_context(|| format!("failed to write config to {output}"))?;

    println!("{} {}", "Sample config written to".green().bold(), output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wikismith.yaml");
        run(path.to_str().unwrap()).unwrap();

        let loaded: AppConfig =
            wikismith_kernel::config::load_config(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.research.max_turns, 3);
        assert!(!loaded.llm.provider.is_empty());
    }
}
