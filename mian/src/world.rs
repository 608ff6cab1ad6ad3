//! Locating region files inside a save game directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub struct World {
    dir: PathBuf,
    nether: bool,
}

impl World {
    pub fn new<P: Into<PathBuf>>(dir: P, nether: bool) -> Self {
        Self { dir: dir.into(), nether }
    }

    /// All world blocks are stored in MCR files under this directory.
    pub fn region_dir(&self) -> PathBuf {
        if self.nether {
            self.dir.join("DIM-1").join("region")
        } else {
            self.dir.join("region")
        }
    }

    /// `*.mcr` files of the world, sorted by name. A missing region
    /// directory yields an empty list.
    pub fn region_files(&self) -> Result<Vec<PathBuf>> {
        let region_dir = self.region_dir();
        if !region_dir.is_dir() {
            log::warn!("No region directory at {}", region_dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let entries = std::fs::read_dir(&region_dir)
            .with_context(|| format!("listing {}", region_dir.display()))?;
        for entry in entries {
            let path = entry.with_context(|| format!("listing {}", region_dir.display()))?.path();
            if path.is_file() && has_extension(&path, "mcr") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Directory name, plus " Nether" when graphing The Nether.
    pub fn title(&self) -> String {
        let mut title = self
            .dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.dir.display().to_string());
        if self.nether {
            title.push_str(" Nether");
        }
        title
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension().is_some_and(|e| e == ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_files() {
        let dir = tempfile::tempdir().unwrap();
        let world = dir.path().join("World1");
        let region = world.join("region");
        std::fs::create_dir_all(&region).unwrap();
        std::fs::create_dir_all(world.join("DIM-1").join("region")).unwrap();
        std::fs::write(region.join("r.1.0.mcr"), b"").unwrap();
        std::fs::write(region.join("r.0.0.mcr"), b"").unwrap();
        std::fs::write(region.join("r.0.0.mca"), b"").unwrap();
        std::fs::write(region.join("notes.txt"), b"").unwrap();
        std::fs::write(world.join("DIM-1").join("region").join("r.-1.0.mcr"), b"").unwrap();

        let overworld = World::new(&world, false);
        let names: Vec<String> = overworld
            .region_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["r.0.0.mcr", "r.1.0.mcr"]);
        assert_eq!(overworld.title(), "World1");

        let nether = World::new(&world, true);
        assert_eq!(nether.region_files().unwrap().len(), 1);
        assert_eq!(nether.title(), "World1 Nether");
    }

    #[test]
    fn test_missing_region_dir() {
        let dir = tempfile::tempdir().unwrap();
        let world = World::new(dir.path().join("nope"), false);
        assert!(world.region_files().unwrap().is_empty());
    }
}
