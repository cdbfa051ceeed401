// src/config.rs
// Configuration for the bingocast server and clients.
// Settings come from conf/*.conf key = value files with sane defaults;
// the server listen port can additionally be overridden by the PORT
// environment variable (the usual deployment knob).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub client_name: String,
    /// External program used to play voice clips (invoked as `<cmd> <file>`).
    pub player_command: String,
    /// Directory holding one clip per number, named `<n>.mp3`.
    pub voices_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            client_name: "DefaultClient".to_string(),
            player_command: "mpv".to_string(),
            voices_dir: "assets/voices".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config_map = parse_config(&content)?;

        let host = config_map.get("host")
            .unwrap_or(&"127.0.0.1".to_string())
            .clone();

        let port = config_map.get("port")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        Ok(ServerConfig { host, port })
    }

    pub fn load_or_default() -> Self {
        let config_path = "conf/server.conf";

        let mut config = match Self::from_file(config_path) {
            Ok(config) => {
                println!("📄 Loaded configuration from {}", config_path);
                config
            }
            Err(e) => {
                println!("⚠️  Could not load config from {}: {}. Using defaults.", config_path, e);
                Self::default()
            }
        };

        // Deployment override: PORT wins over the conf file.
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                config.port = port;
            }
        }

        config
    }
}

impl ClientConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        let config_map = parse_config(&content)?;

        let defaults = Self::default();

        let host = config_map.get("host")
            .unwrap_or(&defaults.host)
            .clone();

        let port = config_map.get("port")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let client_name = config_map.get("client_name")
            .unwrap_or(&defaults.client_name)
            .clone();

        let player_command = config_map.get("player_command")
            .unwrap_or(&defaults.player_command)
            .clone();

        let voices_dir = config_map.get("voices_dir")
            .unwrap_or(&defaults.voices_dir)
            .clone();

        Ok(ClientConfig { host, port, client_name, player_command, voices_dir })
    }

    pub fn load_or_default() -> Self {
        let config_path = "conf/client.conf";

        match Self::from_file(config_path) {
            Ok(config) => {
                println!("📄 Loaded client configuration from {}", config_path);
                config
            }
            Err(e) => {
                println!("⚠️  Could not load client config from {}: {}. Using defaults.", config_path, e);
                Self::default()
            }
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}:{}/ws", self.host, self.port)
    }
}

fn parse_config(content: &str) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let mut config = HashMap::new();

    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Parse key = value pairs
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim().to_string();
            let value = value.trim().to_string();
            config.insert(key, value);
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let content = r#"
            # This is a comment
            host = 192.168.1.100
            port = 8080
            # Another comment
            player_command = ffplay
        "#;

        let config = parse_config(content).unwrap();
        assert_eq!(config.get("host"), Some(&"192.168.1.100".to_string()));
        assert_eq!(config.get("port"), Some(&"8080".to_string()));
        assert_eq!(config.get("player_command"), Some(&"ffplay".to_string()));
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.client_name, "DefaultClient");
        assert_eq!(config.player_command, "mpv");
        assert_eq!(config.voices_dir, "assets/voices");
    }

    #[test]
    fn test_client_config_urls() {
        let config = ClientConfig {
            host: "192.168.1.100".to_string(),
            port: 8080,
            ..ClientConfig::default()
        };
        assert_eq!(config.server_url(), "http://192.168.1.100:8080");
        assert_eq!(config.ws_url(), "ws://192.168.1.100:8080/ws");
    }
}
