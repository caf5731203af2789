use crate::areas::repository::Repository;
use anyhow::Context;
use std::fs;

const DEFAULT_BRANCH: &str = "master";

const DIRECTORIES: [&str; 7] = [
    "info",
    "objects",
    "objects/info",
    "objects/pack",
    "refs",
    "refs/heads",
    "refs/tags",
];

const DEFAULT_CONFIG: &str = "[core]
\trepositoryformatversion = 0
\tfilemode = true
\tbare = false
\tlogallrefupdates = true
";

const DEFAULT_DESCRIPTION: &str =
    "Unnamed repository; edit this file 'description' to name the repository.\n";

const DEFAULT_EXCLUDE: &str = "# git ls-files --others --exclude-from=.git/info/exclude
# Lines that start with '#' are comments.
# For a project mostly in C, the following would be a good set of
# exclude patterns (uncomment them if you want to use them):
# *.[oa]
# *~
";

impl Repository {
    /// Lay out `.git`; existing files are left alone so re-running is harmless
    pub fn init(&mut self) -> anyhow::Result<()> {
        let git_path = self.git_path();
        let reinitialized = git_path.exists();

        for dir in DIRECTORIES {
            let dir_path = git_path.join(dir);
            fs::create_dir_all(&dir_path)
                .with_context(|| format!("Failed to create {}", dir_path.display()))?;
        }

        let head = format!("ref: refs/heads/{}\n", DEFAULT_BRANCH);
        for (name, content) in [
            ("HEAD", head.as_str()),
            ("config", DEFAULT_CONFIG),
            ("description", DEFAULT_DESCRIPTION),
            ("info/exclude", DEFAULT_EXCLUDE),
        ] {
            let file_path = git_path.join(name);
            if !file_path.exists() {
                fs::write(&file_path, content)
                    .with_context(|| format!("Failed to write {}", file_path.display()))?;
            }
        }

        tracing::debug!(path = %git_path.display(), reinitialized, "initialized repository");

        writeln!(
            self.writer(),
            "{} empty Git repository in {}/",
            if reinitialized {
                "Reinitialized existing"
            } else {
                "Initialized"
            },
            git_path.display()
        )?;

        Ok(())
    }
}
