use std::collections::HashMap;

pub(crate) const SERVICE_NAME: &str = "godspeed";

fn attributes(base_id: &str) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("base", base_id);
    attrs
}

/// Store the API key for a base in the system keyring via Secret Service.
pub async fn store_api_key(base_id: &str, api_key: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    keyring
        .create_item(
            &format!("Godspeed Airtable ({})", base_id),
            &attributes(base_id),
            api_key.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store API key: {}", e))?;

    Ok(())
}

/// Load the API key for a base from the system keyring.
pub async fn load_api_key(base_id: &str) -> Result<Option<String>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(base_id))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let key = String::from_utf8(secret.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        if !key.is_empty() {
            return Ok(Some(key));
        }
    }

    Ok(None)
}

/// Remove every stored key for a base.
pub async fn delete_api_key(base_id: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(base_id))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete API key: {}", e))?;
    }

    Ok(())
}
