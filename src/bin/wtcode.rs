use std::error::Error;
use clap::{Parser, Subcommand, Args};
use quinn::{ReadError, VarInt};
use tracing_subscriber::EnvFilter;
use wtcode::capsule::CloseSession;
use wtcode::codes::{self, StreamErrorCode, SessionErrorCode};
use wtcode::util::HexBytes;
use wtcode::Classifier;

/// WT_SESSION_GONE, sent on every stream of a session when the session goes away.
const DEFAULT_SESSION_CLOSE_CODE: u64 = 0x170d7b68;

#[derive(Parser)]
#[command(name = "wtcode", about = "Translate WebTransport error codes")]
struct Opt {
    #[command(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Encode a WebTransport stream error code as an HTTP/3 error code
    Encode(Encode),
    /// Decode an HTTP/3 error code into a WebTransport stream error code
    Decode(Decode),
    /// Report how a stream reset with the given HTTP/3 code would be classified
    Classify(Classify),
    /// Print a CLOSE_WEBTRANSPORT_SESSION capsule as hex
    CloseCapsule(CloseCapsule),
}

#[derive(Args)]
struct Encode {
    #[arg(value_parser = parse_u32)]
    code: u32,
}

#[derive(Args)]
struct Decode {
    #[arg(value_parser = parse_u64)]
    http_code: u64,
}

#[derive(Args)]
struct Classify {
    #[arg(value_parser = parse_u64)]
    http_code: u64,
    #[arg(long, value_parser = parse_u64, default_value_t = DEFAULT_SESSION_CLOSE_CODE)]
    session_close: u64,
}

#[derive(Args)]
struct CloseCapsule {
    #[arg(value_parser = parse_u32)]
    code: u32,
    #[arg(default_value = "")]
    message: String,
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let res = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse::<u64>(),
    };
    res.map_err(|e| format!("invalid number {}: {}", s, e))
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let value = parse_u64(s)?;
    u32::try_from(value).map_err(|_| format!("{} does not fit in 32 bits", s))
}

fn encode(args: &Encode) -> Result<(), Box<dyn Error>> {
    let http_code = codes::encode(StreamErrorCode(args.code));
    tracing::debug!(code = args.code, http_code, "encoded");
    println!("{:#x}", http_code);
    Ok(())
}

fn decode(args: &Decode) -> Result<(), Box<dyn Error>> {
    let code = codes::decode(args.http_code)?;
    tracing::debug!(http_code = args.http_code, %code, "decoded");
    println!("{}", code);
    Ok(())
}

fn classify(args: &Classify) -> Result<(), Box<dyn Error>> {
    let classifier = Classifier::new(VarInt::from_u64(args.session_close)?);
    let err = ReadError::Reset(VarInt::from_u64(args.http_code)?);
    let classification = classifier.classify(Some(&err));
    tracing::debug!(
        http_code = args.http_code,
        protocol = classification.is_protocol_error(),
        "classified"
    );
    println!("{:?}", classification);
    Ok(())
}

fn close_capsule(args: &CloseCapsule) -> Result<(), Box<dyn Error>> {
    let capsule = CloseSession::new(SessionErrorCode(args.code), args.message.as_str())?;
    let mut out: Vec<u8> = Vec::new();
    capsule.encode(&mut out);
    tracing::debug!(len = out.len(), "encoded capsule");
    println!("{:#}", HexBytes(&out));
    Ok(())
}

fn main_inner() -> Result<(), Box<dyn Error>> {
    let opt = Opt::parse();
    match opt.subcmd {
        SubCommand::Encode(s) => encode(&s),
        SubCommand::Decode(s) => decode(&s),
        SubCommand::Classify(s) => classify(&s),
        SubCommand::CloseCapsule(s) => close_capsule(&s),
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match main_inner() {
        Ok(()) => {},
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
