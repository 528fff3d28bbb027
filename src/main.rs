use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use medcode_agent::orchestrator::DEFAULT_BATCH_SIZE;
use medcode_agent::utils::logging;
use medcode_agent::{App, BaselineOptions, Config, RunOptions};

#[derive(Parser)]
#[command(
    name = "medcode-agent",
    version,
    about = "Answer multiple-choice medical coding exam questions"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Answer every question with the reasoning loop
    Run {
        /// Exam text file with numbered questions
        #[arg(value_name = "EXAM")]
        exam: PathBuf,

        /// Fee schedule CSV with HCPCS and DESCRIPTION columns
        #[arg(long, env = "LOOKUP_TABLE")]
        table: PathBuf,

        /// Result log
        #[arg(long, default_value = "agent_responses.txt")]
        output: PathBuf,

        /// JSON-lines file with one reasoning trace per question
        #[arg(long)]
        trace_file: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Override MAX_ITERATIONS
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Answer questions without tools, several per request
    Baseline {
        #[arg(value_name = "EXAM")]
        exam: PathBuf,

        #[arg(long, default_value = "wrapper_responses.txt")]
        output: PathBuf,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Score a result log against a TOML answer key
    Score {
        #[arg(value_name = "RESULTS")]
        results: PathBuf,

        #[arg(long = "key", value_name = "ANSWER_KEY")]
        answer_key: PathBuf,
    },

    /// Look codes up in the local table
    Lookup {
        #[arg(long, env = "LOOKUP_TABLE")]
        table: PathBuf,

        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置，命令行参数优先
    let mut config = Config::from_env()?;
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Run {
            exam,
            table,
            output,
            trace_file,
            batch_size,
            max_iterations,
        } => {
            if let Some(max_iterations) = max_iterations {
                config.max_iterations = max_iterations;
            }
            let options = RunOptions {
                exam,
                table,
                output,
                trace_file,
                batch_size,
            };
            App::new(config).run(&options).await?;
        }
        Command::Baseline {
            exam,
            output,
            batch_size,
        } => {
            let options = BaselineOptions {
                exam,
                output,
                batch_size,
            };
            App::new(config).baseline(&options).await?;
        }
        Command::Score { results, answer_key } => {
            let report = App::new(config).score(&results, &answer_key).await?;
            println!("{}", report);
        }
        Command::Lookup { table, codes } => {
            let descriptions = App::new(config).lookup(&table, &codes)?;
            info!("🔎 查询 {} 个编码", descriptions.len());
            for description in descriptions {
                println!("{}", description);
            }
        }
    }

    Ok(())
}
