use axml_manifest::android::zip::read_manifest_entry;
use axml_manifest::android::{is_binary_xml, parse_manifest_entry, parse_nodes};
use std::env;
use std::error::Error;

// Prints the package facts of each APK as JSON. With --nodes the flattened start tags of
// a binary manifest are printed as well.

//Usage: manifest_info [--nodes] <apk-file>...
fn main()
{
    let args: Vec<String> = env::args().skip(1).collect();
    let show_nodes = args.iter().any(|a| a == "--nodes");
    let apks: Vec<&String> = args.iter().filter(|a| *a != "--nodes").collect();
    if apks.is_empty() {
        println!("Usage: manifest_info [--nodes] <apk-file>...");
        return;
    }

    for apk in apks {
        if let Err(e) = process_apk(apk, show_nodes) {
            println!("{apk}: {e}");
        }
    }
}

fn process_apk(apk_file: &str, show_nodes: bool) -> Result<(), Box<dyn Error>>
{
    let data = read_manifest_entry(apk_file)?;
    match parse_manifest_entry(&data) {
        Ok(facts) => println!("{}", serde_json::to_string_pretty(&facts)?),
        Err(e) if e.is_not_found() => println!("{apk_file}: no package facts ({e})"),
        Err(e) => return Err(e.into()),
    }

    if show_nodes && is_binary_xml(&data) {
        for node in parse_nodes(&data) {
            println!("{}", serde_json::to_string(&node)?);
        }
    }
    Ok(())
}
