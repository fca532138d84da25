//! Runs one CLI command against a registry

use crate::cli::args::{Args, Command};
use crate::digest::Digest;
use crate::error::Result;
use crate::logging::Logger;
use crate::registry::{RegistryClient, RegistryClientBuilder, RequestContext};
use std::path::Path;
use std::time::Instant;
use tokio::io::AsyncWriteExt;

pub struct Runner {
    args: Args,
    output: Logger,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        let output = if args.quiet {
            Logger::new_quiet()
        } else {
            Logger::new(args.verbose)
        };
        // A pull without -o streams the blob to stdout
        let output = match &args.command {
            Command::Pull { output: None, .. } => output.with_stderr_only(),
            _ => output,
        };

        Self { args, output }
    }

    pub async fn run(&self, ctx: &RequestContext) -> Result<()> {
        let start_time = Instant::now();
        let config = self.args.client_config()?;
        let timeout = config.timeout();
        let client = RegistryClientBuilder::from_config(config)
            .with_logger(self.output.clone())
            .build()?;

        let ctx = match timeout {
            Some(timeout) => ctx.child().with_timeout(timeout),
            None => ctx.child(),
        };
        match &self.args.command {
            Command::Exists { repository, digest } => {
                let digest = Digest::parse(digest)?;
                let found = client.exists(&ctx, repository, &digest).await?;
                println!("{}", found);
            }
            Command::Pull {
                repository,
                digest,
                output,
            } => {
                let digest = Digest::parse(digest)?;
                self.pull(&client, &ctx, repository, &digest, output.as_deref())
                    .await?;
            }
            Command::Push {
                repository,
                file,
                digest,
                skip_existing,
            } => {
                self.push(&client, &ctx, repository, file, digest.as_deref(), *skip_existing)
                    .await?;
            }
            Command::Config { repository, digest } => {
                let digest = Digest::parse(digest)?;
                let config: serde_json::Value =
                    client.get_config(&ctx, repository, &digest).await?;
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }

        self.output.detail(&format!(
            "Finished in {:.2}s",
            start_time.elapsed().as_secs_f64()
        ));
        Ok(())
    }

    async fn pull(
        &self,
        client: &RegistryClient,
        ctx: &RequestContext,
        repository: &str,
        digest: &Digest,
        destination: Option<&Path>,
    ) -> Result<()> {
        let stream = client
            .download(ctx, repository, digest)
            .await?
            .error_for_status()?;

        let written = match destination {
            Some(path) => {
                let mut file = tokio::fs::File::create(path).await?;
                let written = stream.copy_to(&mut file).await?;
                file.flush().await?;
                written
            }
            None => {
                let mut stdout = tokio::io::stdout();
                let written = stream.copy_to(&mut stdout).await?;
                stdout.flush().await?;
                written
            }
        };

        self.output.success(&format!(
            "Pulled blob {} ({})",
            digest.short(),
            self.output.format_size(written)
        ));
        Ok(())
    }

    async fn push(
        &self,
        client: &RegistryClient,
        ctx: &RequestContext,
        repository: &str,
        file: &Path,
        digest: Option<&str>,
        skip_existing: bool,
    ) -> Result<()> {
        let digest = match digest {
            Some(digest) => Digest::parse(digest)?,
            None => Digest::sha256_file(file).await?,
        };
        let size = tokio::fs::metadata(file).await?.len();

        if skip_existing && client.exists(ctx, repository, &digest).await? {
            self.output
                .info(&format!("Blob {} already exists, skipping", digest.short()));
            return Ok(());
        }

        let reader = tokio::fs::File::open(file).await?;
        client.upload_reader(ctx, repository, &digest, reader).await?;
        self.output.success(&format!(
            "Pushed {} ({}) as {}",
            file.display(),
            self.output.format_size(size),
            digest
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn runner(argv: &[&str]) -> Runner {
        Runner::new(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_pull_to_stdout_moves_messages_to_stderr() {
        let to_stdout = runner(&["blob-transfer", "-r", "localhost:5000", "pull", "repo", "sha256:abc"]);
        assert!(to_stdout.output.stderr_only);

        let to_file = runner(&[
            "blob-transfer",
            "-r",
            "localhost:5000",
            "pull",
            "repo",
            "sha256:abc",
            "-o",
            "blob.bin",
        ]);
        assert!(!to_file.output.stderr_only);

        let push = runner(&["blob-transfer", "-r", "localhost:5000", "push", "repo", "layer.tar"]);
        assert!(!push.output.stderr_only);
    }
}
