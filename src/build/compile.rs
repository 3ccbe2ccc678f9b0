//! A single `go build` for one platform and one package

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use indicatif::ProgressBar;
use regex::Regex;

use super::orchestrator::{BuildTask, TaskRunner};
use super::platform::Platform;
use super::template::{base_name, TemplateVars};
use super::BuildConfig;
use crate::exec::subprocess::{run_command, RunOptions};

/// Everything needed to spawn the compiler for one task
#[derive(Debug, Clone)]
pub struct CompileInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub options: RunOptions,
    pub output_path: PathBuf,
}

/// Assemble the go invocation for `entry_point` on `platform`
pub fn plan(cfg: &BuildConfig, platform: &Platform, entry_point: &str) -> Result<CompileInvocation> {
    let host = Platform::host();
    let cgo_env = std::env::var("CGO_ENABLED").ok();
    let cgo = cgo_enabled(cfg.cgo, platform, host.as_ref(), cgo_env.as_deref());

    let mut output = cfg.output.render(&TemplateVars {
        dir: base_name(entry_point),
        os: &platform.os,
        arch: &platform.arch,
    });
    output.push_str(platform.exe_suffix());

    // The output must be absolute because vendored packages build from
    // their own directory.
    let output_path = absolute(Path::new(&output))?;

    let (current_dir, package) = match vendored_dir(entry_point, cfg!(windows))? {
        Some(dir) => (Some(PathBuf::from(dir)), ".".to_string()),
        None => (None, entry_point.to_string()),
    };

    let flags = cfg.flags.for_platform(platform);

    let mut args = vec!["build".to_string()];
    if cfg.rebuild {
        args.push("-a".to_string());
    }
    if !cfg.mod_mode.is_empty() {
        args.push("-mod".to_string());
        args.push(cfg.mod_mode.clone());
    }
    if cfg.race {
        args.push("-race".to_string());
    }
    args.extend([
        "-gcflags".to_string(),
        flags.gcflags,
        "-ldflags".to_string(),
        flags.ldflags,
        "-asmflags".to_string(),
        flags.asmflags,
        "-tags".to_string(),
        cfg.tags.clone(),
        "-o".to_string(),
        output_path.to_string_lossy().to_string(),
        package,
    ]);

    let env = vec![
        ("GOOS".to_string(), platform.os.clone()),
        ("GOARCH".to_string(), platform.arch.clone()),
        (
            "CGO_ENABLED".to_string(),
            if cgo { "1" } else { "0" }.to_string(),
        ),
    ];

    Ok(CompileInvocation {
        program: cfg.go_cmd.clone(),
        args,
        options: RunOptions { env, current_dir },
        output_path,
    })
}

/// Decide whether cgo is on for a target
///
/// `--cgo` forces it on. Otherwise it is on only for native builds, and
/// `CGO_ENABLED=0` in the environment turns that off too.
pub fn cgo_enabled(
    configured: bool,
    target: &Platform,
    host: Option<&Platform>,
    env_value: Option<&str>,
) -> bool {
    if configured {
        return true;
    }
    if env_value == Some("0") {
        return false;
    }
    host == Some(target)
}

/// Directory to build from for packages outside any module or GOPATH
///
/// go reports those as `_` followed by the absolute directory. On Windows
/// `/c_/src/app` stands for `c:\src\app`.
pub fn vendored_dir(entry_point: &str, windows_host: bool) -> Result<Option<String>> {
    let Some(path) = entry_point.strip_prefix('_') else {
        return Ok(None);
    };

    if !windows_host {
        return Ok(Some(path.to_string()));
    }

    let drive = Regex::new(r"^/([a-zA-Z])_/")?;
    let dir = drive.replace(path, "${1}:\\");
    Ok(Some(dir.replace('/', "\\")))
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(cwd.join(path))
}

/// Runs `go build` for orchestrated tasks
pub struct GoCompiler {
    config: BuildConfig,
    progress: ProgressBar,
    verbose: bool,
}

impl GoCompiler {
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            progress: ProgressBar::hidden(),
            verbose: false,
        }
    }

    /// Print through this bar so output does not tear it
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

impl TaskRunner for GoCompiler {
    fn run(&self, task: &BuildTask) -> Result<()> {
        let invocation = plan(&self.config, &task.platform, &task.entry_point)?;

        if self.verbose {
            self.progress.suspend(|| {
                eprintln!(
                    "    {} {} (GOOS={} GOARCH={})",
                    invocation.program,
                    invocation.args.join(" "),
                    task.platform.os,
                    task.platform.arch
                )
            });
        }

        let result = run_command(&invocation.program, &invocation.args, &invocation.options)?;
        if !result.success {
            bail!("{}\nStderr: {}", result.status, result.stderr);
        }

        if self.verbose {
            self.progress.suspend(|| {
                eprintln!(
                    "    {} ({:.2}s)",
                    invocation.output_path.display(),
                    result.duration.as_secs_f64()
                )
            });
        }

        Ok(())
    }
}
