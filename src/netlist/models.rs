//! Built-in device model library.
//!
//! Every deck carries the full library, so any model name the emitter picks
//! is always defined. Declared part numbers are matched by substring against
//! each model's part families.

/// A `.model` card and the part families it stands in for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceModel {
    /// Model name referenced by device lines
    pub name: &'static str,
    /// Lowercase substrings of declared part numbers mapped to this model
    pub families: &'static [&'static str],
    /// The `.model` card
    pub card: &'static str,
}

/// Rectifier and signal diodes.
pub const DIODE_MODELS: &[DeviceModel] = &[
    DeviceModel {
        name: "D1N4148",
        families: &["4148", "1n914"],
        card: ".model D1N4148 D(Is=2.52n Rs=0.568 N=1.752 Cjo=4p M=0.4 Tt=20n Bv=100 Ibv=100u)",
    },
    DeviceModel {
        name: "D1N4001",
        families: &["4001", "4002", "4004", "4007"],
        card: ".model D1N4001 D(Is=14.11n Rs=33.89m N=1.984 Cjo=25.89p M=0.44 Vj=0.3245 Tt=5.7u Bv=75 Ibv=10u)",
    },
    DeviceModel {
        name: "D1N5817",
        families: &["5817", "5819", "schottky"],
        card: ".model D1N5817 D(Is=31.7u Rs=51m N=1.373 Cjo=190p M=0.3 Vj=0.35 Bv=20 Ibv=1m)",
    },
];

/// Light-emitting diodes, selected by colour.
pub const LED_MODELS: &[DeviceModel] = &[
    DeviceModel {
        name: "LED_RED",
        families: &["red"],
        card: ".model LED_RED D(Is=93.2p Rs=42m N=3.73 Cjo=2.97p M=0.333 Vj=0.75 Bv=4 Ibv=10u)",
    },
    DeviceModel {
        name: "LED_GREEN",
        families: &["green"],
        card: ".model LED_GREEN D(Is=93.2p Rs=42m N=4.3 Cjo=2.97p M=0.333 Vj=0.75 Bv=4 Ibv=10u)",
    },
    DeviceModel {
        name: "LED_BLUE",
        families: &["blue", "white"],
        card: ".model LED_BLUE D(Is=93.2p Rs=42m N=5.6 Cjo=2.97p M=0.333 Vj=0.75 Bv=5 Ibv=10u)",
    },
];

/// Small-signal bipolar transistors. Specific parts come before the generic
/// "pnp" family so that "BC557 PNP" picks the BC557.
pub const TRANSISTOR_MODELS: &[DeviceModel] = &[
    DeviceModel {
        name: "Q2N3904",
        families: &["3904"],
        card: ".model Q2N3904 NPN(Is=6.734f Bf=416.4 Vaf=74.03 Ne=1.259 Ise=6.734f Ikf=66.78m Br=0.7371 Rb=10 Rc=1 Cjc=3.638p Cje=4.493p Tf=301.2p Tr=239.5n)",
    },
    DeviceModel {
        name: "Q2N2222",
        families: &["2222"],
        card: ".model Q2N2222 NPN(Is=14.34f Bf=255.9 Vaf=74.03 Ne=1.307 Ise=14.34f Ikf=0.2847 Br=6.092 Rb=10 Rc=1 Cjc=7.306p Cje=22.01p Tf=411.1p Tr=46.91n)",
    },
    DeviceModel {
        name: "QBC547",
        families: &["bc547", "bc548", "bc549"],
        card: ".model QBC547 NPN(Is=7.049f Bf=374.6 Vaf=62.79 Ne=1.576 Ise=68f Ikf=0.08157 Br=1 Rb=10 Rc=1 Cjc=5.25p Cje=11.5p Tf=410p Tr=10n)",
    },
    DeviceModel {
        name: "QBC557",
        families: &["bc557", "bc558", "bc559"],
        card: ".model QBC557 PNP(Is=10.2f Bf=290 Vaf=50 Ne=1.5 Ikf=0.1 Br=8 Rb=10 Rc=1 Cjc=9p Cje=13p Tf=600p Tr=10n)",
    },
    DeviceModel {
        name: "Q2N3906",
        families: &["3906", "pnp"],
        card: ".model Q2N3906 PNP(Is=1.41f Bf=180.7 Vaf=18.7 Ne=1.5 Ikf=80m Br=4.977 Rb=10 Rc=2.5 Cjc=9.728p Cje=8.063p Tf=179.3p Tr=33.42n)",
    },
];

/// Default model for plain diodes.
pub const DEFAULT_DIODE: &str = "D1N4148";

/// Default model for LEDs.
pub const DEFAULT_LED: &str = "LED_RED";

/// Default model for transistors.
pub const DEFAULT_TRANSISTOR: &str = "Q2N3904";

/// Pick a model from `candidates` for a declared part number.
pub fn select_model(
    candidates: &[DeviceModel],
    declared: Option<&str>,
    default: &'static str,
) -> &'static str {
    let Some(declared) = declared.map(|d| d.trim().to_ascii_lowercase()) else {
        return default;
    };
    if declared.is_empty() {
        return default;
    }
    candidates
        .iter()
        .find(|m| {
            m.name.eq_ignore_ascii_case(&declared)
                || m.families.iter().any(|f| declared.contains(f))
        })
        .map(|m| m.name)
        .unwrap_or(default)
}

/// The complete library as deck text, one card per line.
pub fn library_text() -> String {
    let mut text = String::from("* device models\n");
    for model in DIODE_MODELS
        .iter()
        .chain(LED_MODELS)
        .chain(TRANSISTOR_MODELS)
    {
        text.push_str(model.card);
        text.push('\n');
    }
    text
}
