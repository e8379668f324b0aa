use integra_core::authorization::{permissions_for, permissions_for_role_name};
use integra_types::{Capability, PermissionSet, Role};
use owo_colors::OwoColorize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::PermissionsCommand;

fn mark(granted: bool) -> String {
    if granted {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

pub fn print_permissions(cmd: &PermissionsCommand) -> anyhow::Result<()> {
    let columns: Vec<(String, &'static PermissionSet)> = match &cmd.role {
        Some(name) => vec![(name.clone(), permissions_for_role_name(name))],
        None => Role::all()
            .into_iter()
            .map(|role| (role.label().to_string(), permissions_for(Some(role))))
            .collect(),
    };

    let mut builder = Builder::default();
    let mut header = vec!["Capability".to_string()];
    header.extend(columns.iter().map(|(name, _)| name.clone()));
    builder.push_record(header);

    for capability in Capability::all() {
        let mut row = vec![capability.as_str().to_string()];
        row.extend(
            columns
                .iter()
                .map(|(_, permissions)| mark(permissions.allows(capability))),
        );
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}
