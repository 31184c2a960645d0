use std::{fs::File, io::Read, io::Write};

use clap::Parser;
use nioxml::{
    charset::{ByteBuffer, Charset, DecodeError, UTF16, UTF16_NAME, canonical_name, find_charset},
    error::XMLError,
    sax::{handler::DebugHandler, parser::XMLReaderBuilder, source::InputSource},
};

#[derive(clap::Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print the events reported for a document.
    Inspect {
        #[clap(long, default_value_t = 4096, help = "number of bytes fed per parse call")]
        chunk_size: usize,
        #[clap(long, help = "encoding used until the XML declaration says otherwise")]
        encoding: Option<String>,
        document: Option<String>,
    },
    /// Convert a document from one encoding to another.
    Transcode {
        #[clap(long)]
        from: String,
        #[clap(long)]
        to: String,
        #[clap(long, help = "write a byte order mark (Unicode encodings only)")]
        bom: bool,
        document: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            chunk_size,
            encoding,
            document,
        } => do_inspect_command(chunk_size, encoding, document)?,
        Command::Transcode {
            from,
            to,
            bom,
            document,
        } => do_transcode_command(&from, &to, bom, document)?,
    }
    Ok(())
}

fn read_document(document: Option<String>) -> std::io::Result<Vec<u8>> {
    let mut bytes = vec![];
    if let Some(document) = document {
        File::open(document)?.read_to_end(&mut bytes)?;
    } else {
        std::io::stdin().lock().read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

fn do_inspect_command(
    chunk_size: usize,
    encoding: Option<String>,
    document: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = read_document(document)?;
    let mut source = match encoding.as_deref() {
        Some(encoding) => InputSource::with_charset_name(encoding)?,
        None => InputSource::new(),
    };
    let mut reader = XMLReaderBuilder::new()
        .set_handler(DebugHandler::default())
        .build();

    reader.start_document()?;
    let mut ret = Ok(());
    for chunk in bytes.chunks(chunk_size.max(1)) {
        source.feed(chunk);
        ret = reader.parse(&mut source);
        print!("{}", reader.handler.buffer);
        reader.handler.buffer.clear();
        if ret.is_err() {
            break;
        }
    }
    let end = reader.end_document();
    print!("{}", reader.handler.buffer);
    ret.and(end)?;
    Ok(())
}

fn do_transcode_command(
    from: &str,
    to: &str,
    bom: bool,
    document: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut decoder = find_charset(from).ok_or(XMLError::ParserUnsupportedEncoding)?;
    let to = canonical_name(to).ok_or(XMLError::ParserUnsupportedEncoding)?;
    let mut encoder: Box<dyn Charset> = if to == UTF16_NAME {
        let mut utf16 = UTF16::default();
        utf16.set_requires_bom(bom);
        Box::new(utf16)
    } else {
        find_charset(to).ok_or(XMLError::ParserUnsupportedEncoding)?
    };

    let mut input = ByteBuffer::from(read_document(document)?);
    let mut output = ByteBuffer::new();
    if bom && to != UTF16_NAME && to.starts_with("UTF") {
        encoder.encode(&mut output, '\u{FEFF}');
    }
    loop {
        match decoder.decode(&mut input) {
            Ok(c) => {
                if !encoder.is_valid(c) {
                    eprintln!("U+{:04X} cannot be represented in {}", c as u32, to);
                }
                encoder.encode(&mut output, c);
            }
            Err(DecodeError::NotEnoughData) if !input.has_remaining() => break,
            Err(err) => {
                eprintln!(
                    "invalid {} sequence at byte {}",
                    decoder.name(),
                    input.position()
                );
                return Err(err.into());
            }
        }
    }

    std::io::stdout().lock().write_all(output.as_bytes())?;
    Ok(())
}
