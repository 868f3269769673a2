use std::path::PathBuf;

use ribsink::{AddressFamily, PrefixBatch};

use crate::commands::load_config;

pub fn handle_template_command(
    project_path: PathBuf,
    family: AddressFamily,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&project_path)?;

    let empty = match family {
        AddressFamily::Evpn => PrefixBatch::Evpn(vec![]),
        AddressFamily::L3Vpn => PrefixBatch::L3Vpn(vec![]),
    };
    let template = empty.template(&config.tables);

    println!("{}<values>{};", template.prefix(), template.suffix());

    Ok(())
}
