use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the function blueprint workspace",
    long_about = "A unified CLI for running CI checks and packaging the\n\
                  blueprint function binaries into deployment zips."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run CI checks (fmt, clippy, tests)
    Ci,
    /// Build and package every function binary as a deployment zip
    Package {
        /// Compilation target triple for function binaries
        #[arg(long, default_value = "x86_64-unknown-linux-gnu")]
        target: String,
        /// Build profile used for binaries
        #[arg(value_enum, long, default_value_t = BuildProfile::Release)]
        profile: BuildProfile,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BuildProfile {
    Debug,
    Release,
}

impl BuildProfile {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    fn as_cargo_flag(self) -> Option<&'static str> {
        match self {
            Self::Debug => None,
            Self::Release => Some("--release"),
        }
    }
}

/// Every deployable binary in `blueprint_lambda`, one zip each.
const FUNCTION_BINS: [&str; 22] = [
    "cloudwatch_logs_shipper",
    "config_rule_change",
    "cors_microservice",
    "custom_authorizer",
    "edge_ab_test",
    "edge_query_auth",
    "edge_viewer_country",
    "firehose_apachelog_to_json",
    "firehose_cloudwatch_logs",
    "firehose_syslog_to_csv",
    "firehose_unzip",
    "hello_http",
    "howto_skill",
    "http_microservice",
    "iot_event_shipper",
    "s3_object_logger",
    "scheduled_canary",
    "ses_notification",
    "ses_spam_filter",
    "smart_home_adapter",
    "sqs_poller",
    "test_harness",
];

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn package_function_zips(target: &str, profile: BuildProfile) {
    ensure_rust_target_installed(target);

    step("Build function binaries");
    let mut cargo_args = vec!["build", "-p", "blueprint_lambda", "--bins", "--target", target];
    if let Some(flag) = profile.as_cargo_flag() {
        cargo_args.push(flag);
    }
    run_cargo(&cargo_args);

    step("Package deployment zip artifacts");
    let profile_dir = profile.dir_name();
    let target_dir = Path::new("target").join(target).join(profile_dir);
    let dist_dir = Path::new("target/lambda");
    fs::create_dir_all(dist_dir).expect("failed to create lambda dist directory");

    for bin in FUNCTION_BINS {
        package_lambda_zip(
            &target_dir.join(binary_name(bin, target)),
            &dist_dir.join(format!("{bin}.zip")),
        );
    }

    eprintln!("\nPackaged artifacts in {}:", dist_dir.display());
    for bin in FUNCTION_BINS {
        eprintln!("- {}", dist_dir.join(format!("{bin}.zip")).display());
    }
}

fn ensure_rust_target_installed(target: &str) {
    let output = Command::new("rustup")
        .args(["target", "list", "--installed"])
        .output();

    let output = match output {
        Ok(value) => value,
        Err(error) => {
            eprintln!(
                "warning: failed to run `rustup target list --installed` ({error}); continuing without target preflight"
            );
            return;
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "failed to list installed rust targets; run `rustup target list --installed` manually. details: {}",
            stderr.trim()
        );
    }

    let installed = String::from_utf8_lossy(&output.stdout);
    if !installed.lines().any(|line| line.trim() == target) {
        panic!(
            "required rust target `{target}` is not installed. install it with `rustup target add {target}` and re-run `cargo run -p xtask -- package`"
        );
    }
}

fn binary_name(bin_name: &str, target: &str) -> String {
    if target.contains("windows") {
        format!("{bin_name}.exe")
    } else {
        bin_name.to_string()
    }
}

fn package_lambda_zip(binary_path: &Path, zip_path: &Path) {
    if !binary_path.exists() {
        panic!("expected lambda binary at '{}'", binary_path.display());
    }

    let binary = fs::read(binary_path).expect("failed to read lambda binary");
    let file = fs::File::create(zip_path).expect("failed to create lambda zip");
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    zip.start_file("bootstrap", options)
        .expect("failed to start bootstrap entry in lambda zip");
    zip.write_all(&binary)
        .expect("failed to write bootstrap entry");
    zip.finish().expect("failed to finish lambda zip");
}

// ── CI ─────────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test blueprint_contracts");
    run_cargo(&["test", "-p", "blueprint_contracts"]);

    step("Test skill_kit");
    run_cargo(&["test", "-p", "skill_kit"]);

    step("Test blueprint_lambda");
    run_cargo(&["test", "-p", "blueprint_lambda"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ci => {
            ci_check();
            eprintln!("\nCI job passed.");
        }
        Commands::Package { target, profile } => {
            package_function_zips(&target, profile);
        }
    }
}
