use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use symcrypt::file::parse_path_list;
use symcrypt::{Charset, CipherConfig, Coordinator, CryptoJobRequest, CryptoJobResult, Direction, IvMaterial, KeyMaterial, MaterialEncoding};
use tokio::io::AsyncReadExt;
use tracing::Level;

use crate::ui::display;

#[derive(Args)]
pub struct JobArgs {
    /// Cipher algorithm, e.g. AES, DESEDE, Threefish-256.
    #[arg(short, long, default_value = "AES")]
    alg: String,

    /// Block mode: CBC, ECB, CFB, OFB, CTR, GCM, CCM, EAX or OCB.
    #[arg(short, long, default_value = "CBC")]
    mode: String,

    /// Padding scheme, e.g. PKCS5Padding or NoPadding.
    #[arg(short, long, default_value = "PKCS5Padding")]
    padding: String,

    #[arg(short, long)]
    key: String,

    /// raw, hex or base64.
    #[arg(long, default_value = "raw")]
    key_encoding: String,

    /// IV or nonce. Ignored in ECB mode.
    #[arg(short, long, default_value = "")]
    iv: String,

    /// raw, hex or base64.
    #[arg(long, default_value = "raw")]
    iv_encoding: String,

    #[arg(short, long, default_value = "UTF-8")]
    charset: String,

    /// Treat the input as file paths, one per argument or line.
    #[arg(short, long)]
    file: bool,

    /// Process every input line as a separate message.
    #[arg(short = 'l', long)]
    per_line: bool,

    /// Text or paths to process. Read from stdin when omitted.
    input: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    Encrypt(JobArgs),

    Decrypt(JobArgs),

    /// List supported algorithms, modes, paddings, charsets and encodings.
    List,
}

#[derive(Parser)]
#[command(name = "symcrypt-rs", version = "26.1.0", about = "Encrypt and decrypt text or files with a configurable symmetric cipher.")]
pub struct App {
    /// Log engine activity at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();
        let level = if app.verbose { Level::DEBUG } else { Level::WARN };
        let subscriber = tracing_subscriber::fmt().with_file(true).with_line_number(true).with_max_level(level).with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)?;
        Ok(app)
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Encrypt(args) => Self::run(args, Direction::Encrypt).await,
            Commands::Decrypt(args) => Self::run(args, Direction::Decrypt).await,
            Commands::List => {
                display::show_listing();
                Ok(())
            }
        }
    }

    async fn run(args: JobArgs, direction: Direction) -> Result<()> {
        let request = Self::request(args, direction).await?;
        display::show_summary(&request.summary());

        let coordinator = Coordinator::try_current()?;
        let result = coordinator.submit(request)?.wait().await.with_context(|| format!("{} failed", direction.progress_label()))?;

        match &result {
            CryptoJobResult::Text(output) => display::show_text(output),
            CryptoJobResult::Files(output) => display::show_files(direction, output),
        }
        display::show_failures(result.failures());

        if !result.is_complete() {
            bail!("{} item(s) failed", result.failures().len());
        }
        Ok(())
    }

    async fn request(args: JobArgs, direction: Direction) -> Result<CryptoJobRequest> {
        let config = CipherConfig::resolve(&args.alg, &args.mode, &args.padding)?;
        let charset: Charset = args.charset.parse()?;

        let key_encoding: MaterialEncoding = args.key_encoding.parse().map_err(|_| anyhow!("unknown key encoding: {}", args.key_encoding))?;
        let iv_encoding: MaterialEncoding = args.iv_encoding.parse().map_err(|_| anyhow!("unknown iv encoding: {}", args.iv_encoding))?;
        let key = KeyMaterial::decode(&args.key, key_encoding, charset).context("invalid key")?;
        let iv = IvMaterial::decode(&args.iv, iv_encoding, charset).context("invalid iv")?;

        let input = if args.input.is_empty() { Self::read_stdin().await? } else { args.input.join("\n") };

        let request = if args.file {
            let paths = parse_path_list(&input);
            if paths.is_empty() {
                bail!("no input files given");
            }
            CryptoJobRequest::files(config, key, iv, direction, paths)
        } else {
            CryptoJobRequest::text(config, key, iv, direction, input)
        };

        Ok(request.with_charset(charset).with_per_line(args.per_line))
    }

    async fn read_stdin() -> Result<String> {
        let mut input = String::new();
        tokio::io::stdin().read_to_string(&mut input).await.context("failed to read stdin")?;
        Ok(input.strip_suffix('\n').map(|s| s.strip_suffix('\r').unwrap_or(s)).unwrap_or(input.as_str()).to_owned())
    }
}
