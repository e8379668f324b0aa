/*!
 * Standalone TypeScript type generator for the integra frontend
 *
 * Writes the session, permission and guard decision types used by the
 * browser code to `frontend/src/generated`.
 *
 * Usage: cargo run -p integra-ts-generator
 */

use integra_types::{ts_rs::TS, *};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // CARGO_MANIFEST_DIR points to the ts-generator directory, parent is workspace root
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let workspace_root = std::path::Path::new(&manifest_dir)
        .parent()
        .ok_or("Failed to get workspace root")?;
    let export_dir = workspace_root.join("frontend/src/generated");

    std::env::set_var("TS_RS_EXPORT_DIR", &export_dir);

    println!("🔧 Generating TypeScript bindings for the authorization core...");

    // Identity and permissions
    Role::export()?;
    Capability::export()?;
    PermissionSet::export()?;
    User::export()?;

    // Session
    Session::export()?;
    SessionStatus::export()?;
    AuthErrorKind::export()?;

    // Guards and navigation
    RouteDecision::export()?;
    CapabilityDecision::export()?;
    NavItem::export()?;

    println!("✅ TypeScript bindings generated successfully!");
    println!("📁 Generated files location: {}", export_dir.display());

    if export_dir.exists() {
        println!("\n📋 Generated files:");
        let mut entries: Vec<_> = std::fs::read_dir(&export_dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext == "ts")
                    .unwrap_or(false)
            })
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            println!("   - {}", entry.file_name().to_string_lossy());
        }
    }

    Ok(())
}
