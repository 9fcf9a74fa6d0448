use serde_json::Value;

use crate::domain::entities::Vault;
use crate::domain::errors::VaultError;
use crate::domain::ports::VaultStore;

// Fetch-or-create use case for the caller's vault.
pub struct GetVaultUseCase<S> {
    pub store: S,
}

impl<S> GetVaultUseCase<S>
where
    S: VaultStore,
{
    pub async fn execute(&self, user_id: &str) -> Result<Vault, VaultError> {
        self.store
            .ensure_user_and_vault(user_id)
            .await
            .map_err(VaultError::StorageFailure)
    }
}

// Replace the caller's vault blob.
pub struct PutVaultUseCase<S> {
    pub store: S,
}

impl<S> PutVaultUseCase<S>
where
    S: VaultStore,
{
    pub async fn execute(&self, user_id: &str, blob: &Value) -> Result<Vault, VaultError> {
        // Validate before touching storage.
        let blob = blob.as_str().ok_or(VaultError::InvalidBlob)?;

        self.store
            .ensure_user_and_vault(user_id)
            .await
            .map_err(VaultError::StorageFailure)?;

        self.store
            .update_blob(user_id, blob)
            .await
            .map_err(VaultError::StorageFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{FailureFlags, RecordingStore};
    use serde_json::json;

    #[tokio::test]
    async fn when_vault_does_not_exist_then_empty_vault_is_created() {
        let store = RecordingStore::new();
        let use_case = GetVaultUseCase {
            store: store.clone(),
        };

        let vault = use_case
            .execute("42")
            .await
            .expect("expected vault to be created");

        assert_eq!(vault.user_id, "42");
        assert_eq!(vault.blob, "");
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn when_vault_exists_then_get_returns_it_unchanged() {
        let store = RecordingStore::new();
        store.insert_test_vault("42", "ciphertext");
        let use_case = GetVaultUseCase { store };

        let vault = use_case
            .execute("42")
            .await
            .expect("expected existing vault");

        assert_eq!(vault.blob, "ciphertext");
    }

    #[tokio::test]
    async fn when_get_storage_fails_then_returns_storage_failure() {
        let use_case = GetVaultUseCase {
            store: RecordingStore::new().with_failures(FailureFlags {
                ensure: true,
                ..Default::default()
            }),
        };

        let result = use_case.execute("42").await;

        assert!(matches!(result, Err(VaultError::StorageFailure(_))));
    }

    #[tokio::test]
    async fn when_blob_is_string_then_vault_is_created_and_updated() {
        let store = RecordingStore::new();
        let use_case = PutVaultUseCase {
            store: store.clone(),
        };

        let vault = use_case
            .execute("42", &json!("v1:nonce:ciphertext"))
            .await
            .expect("expected vault update to succeed");

        assert_eq!(vault.blob, "v1:nonce:ciphertext");
        let saved = store.get_test_vault("42").expect("expected vault row");
        assert_eq!(saved.blob, "v1:nonce:ciphertext");
        assert!(saved.updated_at.timestamp() > 1_700_000_000);
    }

    #[tokio::test]
    async fn when_blob_is_empty_string_then_vault_is_cleared() {
        let store = RecordingStore::new();
        store.insert_test_vault("42", "ciphertext");
        let use_case = PutVaultUseCase {
            store: store.clone(),
        };

        let vault = use_case
            .execute("42", &json!(""))
            .await
            .expect("expected vault update to succeed");

        assert_eq!(vault.blob, "");
    }

    #[tokio::test]
    async fn when_blob_is_not_a_string_then_returns_invalid_blob_without_touching_storage() {
        let store = RecordingStore::new();
        let use_case = PutVaultUseCase {
            store: store.clone(),
        };

        for blob in [json!(null), json!(12), json!({"nested": "x"}), json!(["a"])] {
            let result = use_case.execute("42", &blob).await;
            assert!(matches!(result, Err(VaultError::InvalidBlob)), "blob {blob}");
        }
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn when_update_fails_then_returns_storage_failure() {
        let use_case = PutVaultUseCase {
            store: RecordingStore::new().with_failures(FailureFlags {
                update: true,
                ..Default::default()
            }),
        };

        let result = use_case.execute("42", &json!("blob")).await;

        assert!(matches!(result, Err(VaultError::StorageFailure(_))));
    }
}
