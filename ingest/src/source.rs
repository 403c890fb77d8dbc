use std::path::Path;

use facevault_corpus::Corpus;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::job::Job;

/// Accepted image extensions, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Result of scanning the source directory.
#[derive(Debug, Default)]
pub struct JobPlan {
    /// Images to encode, sorted by name.
    pub jobs: Vec<Job>,
    /// Images skipped because the corpus already has them.
    pub known: Vec<String>,
    /// Files skipped because they are not supported images.
    pub unsupported: Vec<String>,
}

/// Reports whether `name` has an accepted image extension.
pub fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|want| ext.eq_ignore_ascii_case(want))
        })
}

/// Lists `dir` and plans one job per image whose name is not in `corpus`.
///
/// Only regular files directly inside `dir` are considered. Job paths are
/// absolute, so the oracle may run from any working directory. Failing to list
/// the directory is fatal: without a job list there is nothing to do.
pub fn plan_jobs(dir: &Path, corpus: &Corpus) -> Result<JobPlan, IngestError> {
    let list_err = |source: std::io::Error| IngestError::SourceDir {
        path: dir.to_path_buf(),
        source,
    };

    let dir = std::path::absolute(dir).map_err(list_err)?;
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(list_err)? {
        let entry = entry.map_err(list_err)?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        entries.push((entry.file_name(), path));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut plan = JobPlan::default();
    for (file_name, path) in entries {
        let Some(name) = file_name.to_str() else {
            debug!("skipping non UTF-8 file name {:?}", file_name);
            plan.unsupported.push(file_name.to_string_lossy().into_owned());
            continue;
        };
        if !is_image(name) {
            debug!("skipping unsupported file {}", name);
            plan.unsupported.push(name.to_string());
            continue;
        }
        if corpus.contains(name) {
            debug!("image {} already processed, skipping", name);
            plan.known.push(name.to_string());
            continue;
        }
        plan.jobs.push(Job {
            path,
            name: name.to_string(),
        });
    }

    info!(
        "planned {} images from {} ({} known, {} unsupported)",
        plan.jobs.len(),
        dir.display(),
        plan.known.len(),
        plan.unsupported.len()
    );
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use facevault_corpus::NamedVector;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"img").unwrap();
    }

    #[test]
    fn extensions_case_insensitive() {
        assert!(is_image("a.jpg"));
        assert!(is_image("a.JPEG"));
        assert!(is_image("a.Png"));
        assert!(!is_image("a.gif"));
        assert!(!is_image("a.jpg.txt"));
        assert!(!is_image("jpg"));
    }

    #[test]
    fn plan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["c.png", "a.JPG", "notes.txt", "b.jpeg", "thumbs.db"] {
            touch(dir.path(), name);
        }
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();

        let plan = plan_jobs(dir.path(), &Corpus::new()).unwrap();
        let names: Vec<&str> = plan.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["a.JPG", "b.jpeg", "c.png"]);
        assert_eq!(plan.jobs[0].path, dir.path().join("a.JPG"));
        assert_eq!(plan.unsupported, vec!["notes.txt", "thumbs.db"]);
        assert!(plan.known.is_empty());
    }

    #[test]
    fn plan_excludes_known_names() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["alice.jpg", "bob.jpg", "carol.png"] {
            touch(dir.path(), name);
        }
        let mut corpus = Corpus::new();
        corpus
            .merge(vec![
                NamedVector::new("bob.jpg", vec![1.0]),
                NamedVector::new("gone.jpg", vec![2.0]),
            ])
            .unwrap();

        let plan = plan_jobs(dir.path(), &corpus).unwrap();
        let names: Vec<&str> = plan.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["alice.jpg", "carol.png"]);
        assert_eq!(plan.known, vec!["bob.jpg"]);
        assert!(plan.jobs.iter().all(|j| !corpus.contains(&j.name)));
    }

    #[test]
    fn plan_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan_jobs(dir.path(), &Corpus::new()).unwrap();
        assert!(plan.jobs.is_empty());
        assert!(plan.known.is_empty());
        assert!(plan.unsupported.is_empty());
    }

    #[test]
    fn plan_relative_dir_yields_absolute_paths() {
        let dir = tempfile::Builder::new()
            .prefix(".plan-")
            .tempdir_in(".")
            .unwrap();
        touch(dir.path(), "face.jpg");
        let relative = Path::new(dir.path().file_name().unwrap());

        let plan = plan_jobs(relative, &Corpus::new()).unwrap();
        assert_eq!(plan.jobs.len(), 1);
        let path = &plan.jobs[0].path;
        assert!(path.is_absolute(), "{}", path.display());
        assert_eq!(
            *path,
            std::env::current_dir().unwrap().join(relative).join("face.jpg")
        );
    }

    #[test]
    fn plan_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let err = plan_jobs(&missing, &Corpus::new()).unwrap_err();
        match err {
            IngestError::SourceDir { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other}"),
        }
    }
}
