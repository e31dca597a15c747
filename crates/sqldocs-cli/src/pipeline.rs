//! Build pipeline
//!
//! Stages run in sequence and each one observes the cancellation token. The
//! schema file is only written once introspection and merge have completed.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use sqldocs_core::{
    DatabaseEngine, Result, SchemaDocument, SchemaProvider, SqlDocsError, check_cancelled,
    document,
};
use sqldocs_docs::{DocsGenerator, MkDocsGenerator};
use tokio_util::sync::CancellationToken;

use crate::logging::TimingGuard;
use crate::progress::Progress;

/// What a run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineCommand {
    /// Introspect and update the schema file
    BuildJson,
    /// Introspect, update the schema file and render the site
    BuildJsonMkDocs,
    /// Render the site from an existing schema file
    BuildMkDocs,
}

/// Settings shared by all stages of a run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub engine: DatabaseEngine,
    /// Connection descriptor; required by the introspecting commands
    pub connection: Option<String>,
    pub schema_file: PathBuf,
    pub output_folder: PathBuf,
    pub language: String,
}

pub struct Pipeline<'a, W: Write> {
    config: &'a PipelineConfig,
    progress: &'a mut Progress<W>,
    cancel: &'a CancellationToken,
}

impl<'a, W: Write> Pipeline<'a, W> {
    pub fn new(
        config: &'a PipelineConfig,
        progress: &'a mut Progress<W>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            progress,
            cancel,
        }
    }

    #[tracing::instrument(skip(self), fields(engine = %self.config.engine))]
    pub async fn run(&mut self, command: PipelineCommand) -> Result<()> {
        match command {
            PipelineCommand::BuildJson => {
                let provider = self.create_provider()?;
                self.build_json(provider.as_ref()).await?;
            }
            PipelineCommand::BuildJsonMkDocs => {
                let provider = self.create_provider()?;
                let schema = self.build_json(provider.as_ref()).await?;
                self.build_mkdocs(schema).await?;
            }
            PipelineCommand::BuildMkDocs => {
                let schema = self.load_schema()?;
                self.build_mkdocs(schema).await?;
            }
        }
        Ok(())
    }

    fn create_provider(&self) -> Result<Box<dyn SchemaProvider>> {
        let descriptor = self.config.connection.as_deref().ok_or_else(|| {
            SqlDocsError::Configuration("a database connection string is required".into())
        })?;
        sqldocs_drivers::create_provider(self.config.engine, descriptor)
    }

    /// Introspect the database and merge the result into the schema file
    pub async fn build_json(&mut self, provider: &dyn SchemaProvider) -> Result<SchemaDocument> {
        let schema_file = self.config.schema_file.as_path();

        self.progress.start("Generate database schema");
        let introspected = {
            let _timer = TimingGuard::new("introspect");
            provider.introspect(self.cancel).await?
        };
        self.progress.finish();

        if schema_file.exists() {
            self.progress.start("Merge and update database schema file");
        } else {
            self.progress.start("Save database schema file");
        }
        let schema = document::load_and_merge(schema_file, introspected)?;
        check_cancelled(self.cancel)?;
        document::save(&schema, schema_file)?;
        self.progress.finish();

        self.progress.success(&format!(
            "Schema file {} successfully generated or updated",
            file_name(schema_file)
        ));
        Ok(schema)
    }

    /// Load the schema file and write it back in normalized form
    fn load_schema(&mut self) -> Result<SchemaDocument> {
        let schema_file = self.config.schema_file.as_path();

        self.progress.start("Load database schema file");
        let schema = document::load(schema_file)?;
        check_cancelled(self.cancel)?;
        document::save(&schema, schema_file)?;
        self.progress.finish();

        self.progress.success(&format!(
            "Schema file {} successfully loaded",
            file_name(schema_file)
        ));
        Ok(schema)
    }

    /// Render the MkDocs project on a blocking task
    pub async fn build_mkdocs(&mut self, schema: SchemaDocument) -> Result<()> {
        check_cancelled(self.cancel)?;

        self.progress.start("Generate MkDocs project");
        let generator = MkDocsGenerator::new(self.config.engine, &self.config.language);
        let output = self.config.output_folder.clone();
        tokio::task::spawn_blocking(move || {
            let _timer = TimingGuard::new("render");
            generator.generate(&schema, &output)
        })
        .await
        .map_err(|e| SqlDocsError::Io(io::Error::other(e)))??;
        self.progress.finish();

        self.progress
            .success("MkDocs project successfully generated or updated");
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
