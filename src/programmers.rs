//! Programmer registration and dispatch
//!
//! A programmer string has the form `name[:key=value,...]`. Opening one
//! yields a boxed bus and chip-select GPIO that the commands wrap in a
//! [`Device`].

use mx25_core::transport::{ChipSelect, GpioOutput, SpiBus};
use mx25_core::Device;

use std::collections::HashMap;
use std::time::Duration;

/// Device handle over whatever programmer was opened
pub type FlashDevice<'a> = Device<'a, dyn SpiBus, dyn GpioOutput<Port = u32>>;

/// Information about a programmer
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available programmers (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    let mut programmers = Vec::new();

    #[cfg(feature = "dummy")]
    programmers.push(ProgrammerInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory MX25V8035F emulator (size=<bytes>,image=<file>)",
    });

    #[cfg(feature = "linux-spi")]
    programmers.push(ProgrammerInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description:
            "Linux spidev + GPIO chip select (dev=/dev/spidevX.Y,cs=<line>,gpiochip=<N>,spispeed=<kHz>,mode=<0-3>)",
    });

    programmers
}

/// Resolve a name or alias to the canonical programmer name
pub fn find_programmer(name: &str) -> Option<&'static str> {
    available_programmers()
        .into_iter()
        .find(|p| p.name == name || p.aliases.contains(&name))
        .map(|p| p.name)
}

/// Parsed programmer parameters
#[derive(Debug)]
pub struct ProgrammerParams {
    /// Programmer name as given
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl ProgrammerParams {
    /// Parameters as borrowed pairs, in the form the back-end parsers take
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a programmer string into name and parameters
pub fn parse_programmer_params(s: &str) -> Result<ProgrammerParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    if name.is_empty() {
        return Err("Empty programmer name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(ProgrammerParams {
        name: name.to_string(),
        params,
    })
}

/// An opened programmer: bus, GPIO and the chip select line on it
pub struct Programmer {
    bus: Box<dyn SpiBus>,
    gpio: Box<dyn GpioOutput<Port = u32>>,
    cs: ChipSelect<u32>,
}

impl Programmer {
    /// Borrow a device handle for one command
    pub fn device(&mut self, timeout: Duration) -> FlashDevice<'_> {
        Device::new(&mut *self.bus, &mut *self.gpio, self.cs, timeout)
    }
}

/// Open the programmer described by `programmer`
pub fn open_programmer(programmer: &str) -> Result<Programmer, Box<dyn std::error::Error>> {
    let params = parse_programmer_params(programmer)?;
    let name = find_programmer(&params.name).ok_or_else(|| {
        format!(
            "Unknown programmer: '{}' (available: {})",
            params.name,
            programmer_names_short()
        )
    })?;

    match name {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),
        #[cfg(feature = "linux-spi")]
        "linux_spi" => open_linux_spi(&params),
        _ => Err(format!("Programmer '{}' is not supported", name).into()),
    }
}

/// Generate a short list of programmer names for CLI help
pub fn programmer_names_short() -> String {
    let programmers = available_programmers();
    let names: Vec<&str> = programmers.iter().map(|p| p.name).collect();
    names.join(", ")
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &ProgrammerParams) -> Result<Programmer, Box<dyn std::error::Error>> {
    use mx25_dummy::{DummyConfig, DummyFlash};

    let mut config = DummyConfig::default();
    for (key, value) in params.pairs() {
        match key {
            "size" => {
                config.size = value
                    .parse()
                    .map_err(|_| format!("Invalid size value: {}", value))?;
            }
            "image" => {}
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }

    config.validate()?;

    let flash = match params.params.get("image") {
        Some(path) => {
            let image = std::fs::read(path)?;
            log::info!("dummy: Loaded {} bytes from {}", image.len(), path);
            DummyFlash::with_data(config, &image)
        }
        None => DummyFlash::new(config),
    };

    Ok(Programmer {
        bus: Box::new(flash.bus()),
        gpio: Box::new(flash.cs()),
        cs: ChipSelect::new(0, 0),
    })
}

#[cfg(feature = "linux-spi")]
fn open_linux_spi(params: &ProgrammerParams) -> Result<Programmer, Box<dyn std::error::Error>> {
    let config = mx25_linux::parse_options(&params.pairs())?;
    let (spi, gpio) = mx25_linux::open(&config)?;
    Ok(Programmer {
        bus: Box::new(spi),
        gpio: Box::new(gpio),
        cs: config.chip_select(),
    })
}
