use std::path::{Path, PathBuf};

pub const DEFAULT_PROMPTS_DIR: &str = "Prompts";
const SAMPLE_FILE: &str = "sample.txt";
const SAMPLE_TEXT: &str =
    "This is a sample prompt.\nYou can create your own prompts using the Create option.";

/// Plain-text prompt library: one `*.txt` file per prompt.
#[derive(Debug, Clone)]
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the directory, seeding a sample prompt on first creation.
    pub fn ensure(&self) -> anyhow::Result<()> {
        if self.dir.exists() {
            return Ok(());
        }
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(SAMPLE_FILE), SAMPLE_TEXT)?;
        Ok(())
    }

    pub fn list(&self) -> anyhow::Result<Vec<String>> {
        self.ensure()?;
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.ends_with(".txt"))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn read(&self, name: &str) -> anyhow::Result<String> {
        Ok(std::fs::read_to_string(self.dir.join(name))?)
    }

    /// Save `content` under `name`, adding `.txt` when missing. Returns the
    /// stored file name.
    pub fn save(&self, name: &str, content: &str) -> anyhow::Result<String> {
        let name = name.trim();
        if name.is_empty() {
            anyhow::bail!("Please enter a file name.");
        }
        if name.contains(&['/', '\\'][..]) {
            anyhow::bail!("File name cannot contain path separators.");
        }
        let file_name = if name.ends_with(".txt") {
            name.to_string()
        } else {
            format!("{name}.txt")
        };
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.dir.join(&file_name), content)?;
        tracing::debug!(file = %file_name, "saved prompt");
        Ok(file_name)
    }

    pub fn remove(&self, name: &str) -> anyhow::Result<()> {
        std::fs::remove_file(self.dir.join(name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PromptStore;
    use tempfile::tempdir;

    #[test]
    fn first_listing_seeds_sample() {
        let dir = tempdir().expect("tempdir");
        let store = PromptStore::new(dir.path().join("Prompts"));
        assert_eq!(store.list().expect("list"), vec!["sample.txt".to_string()]);
    }

    #[test]
    fn save_read_remove_roundtrip() {
        let dir = tempdir().expect("tempdir");
        let store = PromptStore::new(dir.path().join("Prompts"));
        store.ensure().expect("ensure");
        let name = store.save("review", "Check this diff").expect("save");
        assert_eq!(name, "review.txt");
        std::fs::write(store.dir().join("ignored.md"), "x").expect("write md");
        assert_eq!(
            store.list().expect("list"),
            vec!["review.txt".to_string(), "sample.txt".to_string()]
        );
        assert_eq!(store.read("review.txt").expect("read"), "Check this diff");
        store.remove("review.txt").expect("remove");
        assert_eq!(store.list().expect("list"), vec!["sample.txt".to_string()]);
    }

    #[test]
    fn blank_or_nested_names_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let store = PromptStore::new(dir.path());
        assert!(store.save("  ", "x").is_err());
        assert!(store.save("../escape", "x").is_err());
    }
}
