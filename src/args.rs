use thiserror::Error;

pub const DEFAULT_KEY: &str = "TestKey";
pub const DEFAULT_VALUE: &str = "TestValue";

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    Read,
    Write,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParsedArguments {
    pub operations: Vec<Operation>,
    pub key: Option<String>,
    pub value: Option<String>,
    pub use_emulator: bool,
    pub debug_logging: bool,
    pub show_help: bool,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseError {
    #[error("invalid argument: {0} (run with --help for help)")]
    InvalidArgument(String),
    #[error("expected argument after --key")]
    MissingKey,
    #[error("expected argument after --value")]
    MissingValue,
    #[error("no operations specified; run with --help for help")]
    NoOperations,
}

impl ParsedArguments {
    /// The key/value pair every write in this run submits.
    pub fn write_pair(&self) -> (&str, &str) {
        let key = self.key.as_deref().unwrap_or(DEFAULT_KEY);
        let value = self.value.as_deref().unwrap_or(DEFAULT_VALUE);
        (key, value)
    }
}

pub fn parse<I, S>(tokens: I) -> Result<ParsedArguments, ParseError>
where I: IntoIterator<Item = S>,
      S: Into<String>,
{
    let mut args = ParsedArguments::default();
    let mut tokens = tokens.into_iter().map(Into::<String>::into);

    while let Some(token) = tokens.next() {
        match token.as_str() {
            "read" => args.operations.push(Operation::Read),
            "write" => args.operations.push(Operation::Write),
            "-k" | "--key" => {
                let key = tokens.next().ok_or(ParseError::MissingKey)?;
                args.key = Some(key);
            }
            "-v" | "--value" => {
                let value = tokens.next().ok_or(ParseError::MissingValue)?;
                args.value = Some(value);
            }
            "-e" | "--emulator" => args.use_emulator = true,
            "-d" | "--debug" => args.debug_logging = true,
            "-h" | "--help" => args.show_help = true,
            _ => return Err(ParseError::InvalidArgument(token)),
        }
    }

    if args.operations.is_empty() && !args.show_help {
        return Err(ParseError::NoOperations);
    }

    Ok(args)
}

pub fn help_text(program: &str) -> String {
    format!(
"Syntax: {prog} [options] <read|write>...

The arguments \"read\" and \"write\" may be specified
one or more times each, and each occurrence causes
the application to perform a read or write operation
on the test document, respectively.

Options:
  -h/--help
    Print this help message and exit.
  -k/--key <key>
    Use this key when writing the document.
  -v/--value <value>
    Use this value when writing the document.
  -e/--emulator
    Connect to the emulator host instead of the default.
  -d/--debug
    Enable debug logging.

Configuration is read from the file named by DOCPROBE_CONFIG,
or docprobe.json in the current directory if it exists.
DOCPROBE_DATA_DIR overrides the configured data directory.

Examples:

Example 1: Perform a read followed by a write:
{prog} read write

Example 2: Perform a write with custom key/value pair:
{prog} -k city -v Dallas write

Example 3: Enable debug logging:
{prog} --debug read write
", prog = program)
}
