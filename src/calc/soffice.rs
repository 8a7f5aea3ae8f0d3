//! Headless LibreOffice driver
//!
//! The input writer never evaluates formulas, and LibreOffice recalculates
//! reliably only when it saves a file, not merely on open. Converting
//! xlsx -> ods forces a full recalculation and save; converting the
//! intermediate back to xlsx produces a clean workbook with cached results.
//! Collapsing the two hops into one risks stale cached values, so the
//! sequence is fixed.

use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::error::{ConvertStep, IllustrationError};

/// Environment variable overriding the soffice binary location
pub const SOFFICE_ENV: &str = "ILLUSTRATION_SOFFICE";

/// Delay between a conversion finishing and the output-file check;
/// soffice can report success before the output hits disk
const OUTPUT_GRACE: Duration = Duration::from_secs(1);

/// Timeout for `which`/`where` lookups
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Poll interval while waiting on a subprocess
const WAIT_POLL: Duration = Duration::from_millis(50);

/// Cap on captured subprocess output carried into error messages
const OUTPUT_CAP: usize = 8 * 1024;

/// Subprocess time limit per conversion step
fn step_timeout(step: ConvertStep) -> Duration {
    match step {
        ConvertStep::XlsxToOds => Duration::from_secs(90),
        ConvertStep::OdsToXlsx => Duration::from_secs(60),
        ConvertStep::XlsxToPdf => Duration::from_secs(60),
    }
}

/// Handle to a located soffice binary
#[derive(Debug, Clone)]
pub struct Soffice {
    binary: PathBuf,
}

impl Soffice {
    /// Locate the binary for this platform
    ///
    /// Order: the `ILLUSTRATION_SOFFICE` override, well-known install
    /// locations, then a PATH lookup (`where` on Windows, `which`
    /// elsewhere). Not finding it is fatal for the whole run.
    pub fn locate() -> Result<Self, IllustrationError> {
        if let Some(overridden) = Self::from_override(env::var_os(SOFFICE_ENV).as_deref())? {
            return Ok(overridden);
        }

        for candidate in install_candidates() {
            if candidate.is_file() {
                info!("found soffice at {}", candidate.display());
                return Ok(Self { binary: candidate });
            }
        }

        if let Some(found) = path_lookup() {
            info!("found soffice on PATH: {}", found.display());
            return Ok(Self { binary: found });
        }
        Err(IllustrationError::SofficeNotFound)
    }

    /// Resolve the `ILLUSTRATION_SOFFICE` override
    ///
    /// An existing file wins outright; a set-but-missing path is fatal,
    /// never a fallback to discovery. Unset defers to discovery.
    fn from_override(value: Option<&OsStr>) -> Result<Option<Self>, IllustrationError> {
        let raw = match value {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let path = PathBuf::from(raw);
        if path.is_file() {
            info!("using soffice from {}: {}", SOFFICE_ENV, path.display());
            Ok(Some(Self { binary: path }))
        } else {
            warn!("{} is set but {} does not exist", SOFFICE_ENV, path.display());
            Err(IllustrationError::SofficeNotFound)
        }
    }

    /// Use an explicit binary path instead of platform discovery
    pub fn at(path: impl Into<PathBuf>) -> Result<Self, IllustrationError> {
        let binary = path.into();
        if binary.is_file() {
            Ok(Self { binary })
        } else {
            warn!("soffice binary {} does not exist", binary.display());
            Err(IllustrationError::SofficeNotFound)
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Run one headless conversion into `outdir`
    ///
    /// Success requires exit code zero and the tool's own expected output
    /// file (input stem, new extension) appearing within a short grace
    /// delay. Returns the produced path; the caller renames it.
    pub fn convert(
        &self,
        step: ConvertStep,
        input: &Path,
        outdir: &Path,
    ) -> Result<PathBuf, IllustrationError> {
        self.convert_within(step, input, outdir, step_timeout(step))
    }

    fn convert_within(
        &self,
        step: ConvertStep,
        input: &Path,
        outdir: &Path,
        timeout: Duration,
    ) -> Result<PathBuf, IllustrationError> {
        let format = step.target_format();
        let expected = expected_output(input, outdir, format);
        if expected.exists() {
            debug!("removing stale output {}", expected.display());
            fs::remove_file(&expected)?;
        }

        info!(
            "converting {} -> {} (timeout {}s)",
            input.display(),
            format,
            timeout.as_secs()
        );
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .arg("--invisible")
            .arg("--nologo")
            .arg("--convert-to")
            .arg(format)
            .arg("--outdir")
            .arg(outdir)
            .arg(input);

        let output = run_with_timeout(&mut command, timeout).map_err(|e| {
            IllustrationError::Launch {
                binary: self.binary.clone(),
                source: e,
            }
        })?;

        if output.timed_out {
            return Err(IllustrationError::ConversionTimeout {
                step,
                timeout_secs: timeout.as_secs(),
            });
        }
        if !output.status.success() {
            return Err(IllustrationError::ConversionFailed {
                step,
                code: output.status.code(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        thread::sleep(OUTPUT_GRACE);
        if !expected.is_file() {
            return Err(IllustrationError::ConversionOutputMissing { step, expected });
        }
        debug!("conversion produced {}", expected.display());
        Ok(expected)
    }

    /// Force a full formula recalculation of `input` via the two-hop dance
    ///
    /// The hop-one output is parked at `intermediate` before hop two runs;
    /// otherwise hop two's output name would collide with `input` itself.
    /// The recalculated workbook ends up at `calculated`.
    pub fn recalculate(
        &self,
        input: &Path,
        intermediate: &Path,
        calculated: &Path,
    ) -> Result<(), IllustrationError> {
        for stale in [intermediate, calculated] {
            if stale.exists() {
                debug!("removing stale file {}", stale.display());
                fs::remove_file(stale)?;
            }
        }
        let outdir = match input.parent() {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };

        let hop_one = self.convert(ConvertStep::XlsxToOds, input, &outdir)?;
        fs::rename(&hop_one, intermediate)?;

        let hop_two = self.convert(ConvertStep::OdsToXlsx, intermediate, &outdir)?;
        fs::rename(&hop_two, calculated)?;

        if let Err(e) = fs::remove_file(intermediate) {
            warn!("could not remove intermediate {}: {}", intermediate.display(), e);
        }
        info!("recalculated {}", calculated.display());
        Ok(())
    }
}

/// Output path soffice will produce: input stem + new extension, in outdir
fn expected_output(input: &Path, outdir: &Path, format: &str) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(format);
    outdir.join(name)
}

#[cfg(target_os = "windows")]
fn install_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for var in ["ProgramFiles", "ProgramFiles(x86)"] {
        if let Ok(base) = env::var(var) {
            candidates.push(
                Path::new(&base)
                    .join("LibreOffice")
                    .join("program")
                    .join("soffice.exe"),
            );
        }
    }
    candidates.push(PathBuf::from(r"C:\Program Files\LibreOffice\program\soffice.exe"));
    candidates.push(PathBuf::from(r"C:\Program Files (x86)\LibreOffice\program\soffice.exe"));
    candidates
}

#[cfg(target_os = "macos")]
fn install_candidates() -> Vec<PathBuf> {
    vec![PathBuf::from(
        "/Applications/LibreOffice.app/Contents/MacOS/soffice",
    )]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn install_candidates() -> Vec<PathBuf> {
    Vec::new()
}

fn path_lookup() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    let (cmd, arg) = ("where", "soffice.exe");
    #[cfg(not(target_os = "windows"))]
    let (cmd, arg) = ("which", "soffice");

    let mut command = Command::new(cmd);
    command.arg(arg);
    let output = run_with_timeout(&mut command, LOOKUP_TIMEOUT).ok()?;
    if output.timed_out || !output.status.success() {
        return None;
    }

    let first = output.stdout.lines().next()?.trim();
    if first.is_empty() {
        return None;
    }
    let path = PathBuf::from(first);
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

struct CommandOutput {
    status: std::process::ExitStatus,
    stdout: String,
    stderr: String,
    timed_out: bool,
}

/// Run a command with piped stdio, killing it when the timeout expires
///
/// Both pipes are drained on reader threads so the child can never block
/// on a full pipe; captured text is capped before it reaches any error.
fn run_with_timeout(command: &mut Command, timeout: Duration) -> std::io::Result<CommandOutput> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let stdout_handle = spawn_reader(child.stdout.take());
    let stderr_handle = spawn_reader(child.stderr.take());

    let timed_out = wait_with_deadline(&mut child, timeout)?;
    let status = child.wait()?;

    let stdout = stdout_handle.join().unwrap_or_default();
    let stderr = stderr_handle.join().unwrap_or_default();
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(source: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut text = String::new();
        if let Some(mut reader) = source {
            let mut buf = Vec::new();
            if reader.read_to_end(&mut buf).is_ok() {
                let end = buf.len().min(OUTPUT_CAP);
                text = String::from_utf8_lossy(&buf[..end]).into_owned();
            }
        }
        text
    })
}

/// Wait for exit, killing the child at the deadline; true means timed out
fn wait_with_deadline(child: &mut Child, timeout: Duration) -> std::io::Result<bool> {
    let deadline = Instant::now() + timeout;
    loop {
        if child.try_wait()?.is_some() {
            return Ok(false);
        }
        if Instant::now() >= deadline {
            warn!("subprocess exceeded {}s; killing it", timeout.as_secs());
            let _ = child.kill();
            return Ok(true);
        }
        thread::sleep(WAIT_POLL);
    }
}
