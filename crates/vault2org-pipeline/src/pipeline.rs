//! Two-phase conversion driver

use crate::discovery::{Discovery, VaultScanner};
use crate::error::PipelineError;
use crate::report::{NoteFailure, RunReport};
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use vault2org_config::Config;
use vault2org_core::{Asset, Note, NoteRenderer, OutputTree, VaultIndex, VaultIndexBuilder};
use vault2org_parser::Converter;

/// Receives progress while notes render
///
/// Called from render workers, so implementations must be thread safe.
pub trait ProgressObserver: Sync {
    /// Rendering is about to start for `total` notes
    fn rendering_started(&self, _total: usize) {}

    /// One note finished, successfully or not
    fn note_finished(&self, _relative_path: &Path, _written: bool) {}
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// The vault conversion orchestrator
///
/// ```text
/// VaultPipeline
///   ├─> VaultScanner      (phase 1: discover)
///   ├─> VaultIndexBuilder (phase 2: index, then freeze)
///   └─> NoteRenderer      (phase 3: render + write, in parallel)
/// ```
pub struct VaultPipeline {
    converter: Arc<dyn Converter>,
    config: Config,
}

enum NoteOutcome {
    Written {
        link_incidents: usize,
        assets_copied: usize,
    },
    Failed(NoteFailure),
}

impl VaultPipeline {
    pub fn new(converter: Arc<dyn Converter>, config: Config) -> Self {
        Self { converter, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Convert `input` into `output`
    pub fn run(&self, input: &Path, output: &Path) -> Result<RunReport, PipelineError> {
        self.run_with_observer(input, output, &NoopObserver)
    }

    /// Convert `input` into `output`, reporting progress to `observer`
    ///
    /// Only problems with the input or output directory themselves are
    /// errors; per-note problems end up in the returned report.
    pub fn run_with_observer(
        &self,
        input: &Path,
        output: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<RunReport, PipelineError> {
        if !input.is_dir() {
            return Err(PipelineError::InputDirectoryMissing(input.to_path_buf()));
        }
        let start = Instant::now();
        info!(
            input = %input.display(),
            output = %output.display(),
            converter = self.converter.name(),
            "starting conversion"
        );

        // Phase 1: discover
        let discovery = VaultScanner::new(input, self.config.discovery.clone()).scan();

        // Phase 2: index
        let (index, skipped) = self.build_index(input, &discovery);
        info!(
            notes = index.note_count(),
            assets = index.asset_count(),
            excluded = discovery.excluded.len(),
            skipped = skipped.len(),
            "vault indexed"
        );

        // Phase 3: render
        let tree = OutputTree::new(output);
        tree.prepare()
            .map_err(|source| PipelineError::OutputDirectory {
                path: output.to_path_buf(),
                source,
            })?;

        let (planned, mut failed) = plan_outputs(&index);
        let jobs = self.config.effective_jobs();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;
        debug!(jobs, notes = planned.len(), "rendering");

        observer.rendering_started(planned.len());
        let renderer = NoteRenderer::new(&index, &tree, self.converter.as_ref())
            .with_content_extensions(&self.config.discovery.content_extensions);
        let outcomes: Vec<NoteOutcome> = pool.install(|| {
            planned
                .par_iter()
                .map(|note| {
                    let outcome = render_one(&renderer, &tree, note);
                    observer.note_finished(
                        note.relative_path(),
                        matches!(outcome, NoteOutcome::Written { .. }),
                    );
                    outcome
                })
                .collect()
        });

        let mut report = RunReport {
            notes_discovered: discovery.notes.len(),
            assets_discovered: discovery.assets.len(),
            excluded: discovery.excluded.len(),
            skipped,
            ..RunReport::default()
        };
        for outcome in outcomes {
            match outcome {
                NoteOutcome::Written {
                    link_incidents,
                    assets_copied,
                } => {
                    report.notes_written += 1;
                    report.link_incidents += link_incidents;
                    report.assets_copied += assets_copied;
                }
                NoteOutcome::Failed(failure) => failed.push(failure),
            }
        }
        failed.sort_by(|a, b| a.path.cmp(&b.path));
        report.failed = failed;

        info!(
            written = report.notes_written,
            failed = report.failed.len(),
            assets_copied = report.assets_copied,
            link_incidents = report.link_incidents,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "conversion finished"
        );
        Ok(report)
    }

    /// Read every discovered note and freeze the index
    ///
    /// Notes that cannot be read or whose frontmatter is malformed are left
    /// out of the index and returned as skipped.
    pub fn build_index(
        &self,
        input: &Path,
        discovery: &Discovery,
    ) -> (VaultIndex, Vec<NoteFailure>) {
        let mut builder = VaultIndexBuilder::new();
        let mut skipped = Vec::new();

        for relative in &discovery.notes {
            match Note::load(input, relative) {
                Ok(note) => {
                    builder.add_note(note);
                }
                Err(err) => {
                    warn!(path = %relative.display(), error = %err, "skipping note");
                    skipped.push(NoteFailure::new(relative, err.kind(), err.to_string()));
                }
            }
        }
        for relative in &discovery.assets {
            builder.add_asset(Asset::new(relative, input.join(relative)));
        }

        (builder.build(), skipped)
    }
}

/// Order notes by path and drop all but the first of any that would write
/// the same output file
fn plan_outputs(index: &VaultIndex) -> (Vec<&Note>, Vec<NoteFailure>) {
    let mut claimed: HashMap<String, &Path> = HashMap::new();
    let mut planned = Vec::with_capacity(index.note_count());
    let mut collisions = Vec::new();

    for note in index.notes_sorted() {
        // Undated notes still render so they fail with the right error
        let Ok(filename) = note.output_filename() else {
            planned.push(note);
            continue;
        };
        match claimed.get(&filename) {
            Some(owner) => {
                warn!(
                    path = %note.relative_path().display(),
                    owner = %owner.display(),
                    output = %filename,
                    "output filename already taken"
                );
                collisions.push(NoteFailure::new(
                    note.relative_path(),
                    "output-collision",
                    format!("{filename} is already written by {}", owner.display()),
                ));
            }
            None => {
                claimed.insert(filename, note.relative_path());
                planned.push(note);
            }
        }
    }

    (planned, collisions)
}

fn render_one(renderer: &NoteRenderer<'_>, tree: &OutputTree, note: &Note) -> NoteOutcome {
    let span = info_span!("note", path = %note.relative_path().display());
    let _entered = span.enter();

    let rendered = match renderer.render(note) {
        Ok(rendered) => rendered,
        Err(err) => {
            warn!(kind = err.kind(), "{err}");
            return NoteOutcome::Failed(NoteFailure::new(
                note.relative_path(),
                err.kind(),
                err.to_string(),
            ));
        }
    };

    for incident in &rendered.incidents {
        warn!(link = %incident.target, "{incident}");
    }

    match tree.write_note(&rendered.output_filename, &rendered.text) {
        Ok(path) => {
            debug!(output = %path.display(), "note written");
            NoteOutcome::Written {
                link_incidents: rendered.incidents.len(),
                assets_copied: rendered.assets_copied,
            }
        }
        Err(err) => {
            warn!(error = %err, "could not write note");
            NoteOutcome::Failed(NoteFailure::new(
                note.relative_path(),
                "write",
                err.to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use vault2org_parser::MarkdownConverter;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn pipeline() -> VaultPipeline {
        VaultPipeline::new(Arc::new(MarkdownConverter::new()), Config::default())
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = pipeline()
            .run(&dir.path().join("absent"), &dir.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::InputDirectoryMissing(_)));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_output_collision_keeps_first_by_path() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("vault");
        write(&vault, "a/My Note.md", "---\ncreated: 2024-01-01\n---\nfrom a\n");
        write(&vault, "b/my-note.md", "---\ncreated: 2024-01-01\n---\nfrom b\n");

        let report = pipeline().run(&vault, &dir.path().join("out")).unwrap();
        assert_eq!(report.notes_written, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].kind, "output-collision");
        assert_eq!(report.failed[0].path, Path::new("b/my-note.md"));

        let text =
            fs::read_to_string(dir.path().join("out/20240101000000-my_note.org")).unwrap();
        assert!(text.ends_with("from a\n"));
    }

    #[test]
    fn test_malformed_frontmatter_is_skipped_at_discovery() {
        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("vault");
        write(&vault, "Broken.md", "---\ntitle: [unclosed\n---\nbody\n");
        write(&vault, "Fine.md", "---\ncreated: 2024-01-01\n---\n[[Broken]]\n");

        let report = pipeline().run(&vault, &dir.path().join("out")).unwrap();
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].path, Path::new("Broken.md"));
        assert_eq!(report.notes_written, 1);
        assert_eq!(report.link_incidents, 1);
    }

    #[test]
    fn test_observer_sees_every_rendered_note() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        #[derive(Default)]
        struct Counting {
            total: AtomicUsize,
            finished: AtomicUsize,
        }

        impl ProgressObserver for Counting {
            fn rendering_started(&self, total: usize) {
                self.total.store(total, Ordering::SeqCst);
            }

            fn note_finished(&self, _relative_path: &Path, _written: bool) {
                self.finished.fetch_add(1, Ordering::SeqCst);
            }
        }

        let dir = TempDir::new().unwrap();
        let vault = dir.path().join("vault");
        write(&vault, "One.md", "---\ncreated: 2024-01-01\n---\n");
        write(&vault, "Two.md", "no timestamp\n");

        let observer = Counting::default();
        pipeline()
            .run_with_observer(&vault, &dir.path().join("out"), &observer)
            .unwrap();
        assert_eq!(observer.total.load(Ordering::SeqCst), 2);
        assert_eq!(observer.finished.load(Ordering::SeqCst), 2);
    }
}
