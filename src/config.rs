use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct HookfeedConfig {
    /// Address the HTTP server listens on
    #[serde(default = "default_address")]
    pub address: IpAddr,
    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,
    /// Where received events are kept
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Default for HookfeedConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            storage: StorageConfig::default(),
        }
    }
}

#[derive(Debug, PartialEq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Embedded database in the directory `path`, events go into the tree `tree`.
    Sled {
        path: PathBuf,
        #[serde(default = "default_tree")]
        tree: String,
    },
    /// Process memory, lost on restart.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Sled {
            path: PathBuf::from("hookfeed-data"),
            tree: default_tree(),
        }
    }
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    5000
}

fn default_tree() -> String {
    "events".to_string()
}
