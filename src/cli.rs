use crate::config::DisplayKind;
use crate::{Error, Result};

/// Options for the `run` command; values are `None` when not provided on CLI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunOptions {
    pub config_path: Option<String>,
    pub interface: Option<String>,
    pub dev_mode: bool,
    pub tick_ms: Option<u64>,
    pub probe_timeout_ms: Option<u64>,
    pub battery_addr: Option<String>,
    pub display: Option<DisplayKind>,
    pub framebuffer_path: Option<String>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

/// Parsed command-line intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run(RunOptions),
    ShowHelp,
    ShowVersion,
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut iter = args.iter();
        match iter.next().map(|s| s.as_str()) {
            None => Ok(Command::Run(RunOptions::default())),
            Some("run") => Ok(Command::Run(parse_run_options(&mut iter)?)),
            Some("--help") | Some("-h") => Ok(Command::ShowHelp),
            Some("--version") | Some("-V") => Ok(Command::ShowVersion),
            Some(flag) if flag.starts_with('-') => {
                // `run` may be omitted; hand every arg to the run parser.
                let mut iter = args.iter();
                Ok(Command::Run(parse_run_options(&mut iter)?))
            }
            Some(cmd) => Err(Error::InvalidArgs(format!(
                "unknown command '{cmd}', try --help"
            ))),
        }
    }

    pub fn help() -> &'static str {
        concat!(
            "port-finder - show the switch port this device is plugged into\n",
            "\n",
            "USAGE:\n",
            "  port-finder [run] [OPTIONS]\n",
            "  port-finder --help\n",
            "  port-finder --version\n",
            "\n",
            "OPTIONS:\n",
            "  -c, --config <path>         Config file (default: ~/.port_finder/config.toml)\n",
            "  -i, --interface <name>      Interface to watch (default: eth0)\n",
            "  --dev                       Show fixed demo neighbor data\n",
            "  --tick-ms <ms>              Frame period (default: 100)\n",
            "  --probe-timeout-ms <ms>     Limit for each lldpctl/battery query (default: 2000)\n",
            "  --battery-addr <host:port>  Battery service (default: 127.0.0.1:8423)\n",
            "  --display <kind>            headless | framebuffer (default: headless)\n",
            "  --framebuffer-path <path>   Target for --display framebuffer\n",
            "  --log-level <level>         error | warn | info | debug | trace\n",
            "  --log-file <path>           Also append log lines to this file\n",
            "  -h, --help                  Show this help\n",
            "  -V, --version               Show version\n",
        )
    }

    pub fn print_help() {
        println!("{}", Self::help());
    }
}

fn parse_run_options(iter: &mut std::slice::Iter<String>) -> Result<RunOptions> {
    let mut opts = RunOptions::default();

    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--config" | "-c" => opts.config_path = Some(take_value(flag, iter)?),
            "--interface" | "-i" => opts.interface = Some(take_value(flag, iter)?),
            "--dev" => opts.dev_mode = true,
            "--tick-ms" => opts.tick_ms = Some(parse_millis(flag, iter)?),
            "--probe-timeout-ms" => opts.probe_timeout_ms = Some(parse_millis(flag, iter)?),
            "--battery-addr" => opts.battery_addr = Some(take_value(flag, iter)?),
            "--display" => {
                let raw = take_value(flag, iter)?;
                opts.display = Some(raw.parse().map_err(Error::InvalidArgs)?);
            }
            "--framebuffer-path" => opts.framebuffer_path = Some(take_value(flag, iter)?),
            "--log-level" => opts.log_level = Some(take_value(flag, iter)?),
            "--log-file" => opts.log_file = Some(take_value(flag, iter)?),
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown flag '{other}', try --help"
                )));
            }
        }
    }

    Ok(opts)
}

fn parse_millis(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<u64> {
    let raw = take_value(flag, iter)?;
    raw.parse()
        .map_err(|_| Error::InvalidArgs(format!("{flag} must be a whole number of milliseconds")))
}

fn take_value(flag: &str, iter: &mut std::slice::Iter<String>) -> Result<String> {
    iter.next()
        .cloned()
        .ok_or_else(|| Error::InvalidArgs(format!("expected a value after {flag}")))
}
