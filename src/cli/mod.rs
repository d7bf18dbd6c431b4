//! CLI command handling

pub mod render;
pub mod serve;
pub mod sign;

pub use render::*;
pub use serve::*;
pub use sign::*;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// 读取 payload：路径为 `-` 时从 stdin 读取
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read payload from stdin")?;
        return Ok(buf);
    }

    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
