use super::store::Collection;

/// Idempotent DDL for every collection, in execution order.
pub fn statements() -> Vec<String> {
    let mut statements = Vec::new();

    for collection in Collection::ALL {
        let table = collection.name();
        statements.push(format!(
            "CREATE TABLE IF NOT EXISTS \"{table}\" (
                id UUID PRIMARY KEY,
                body JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )"
        ));
        statements.push(format!(
            "CREATE INDEX IF NOT EXISTS \"{table}_created_idx\" ON \"{table}\" (created_at, id)"
        ));

        if collection != Collection::Tenants {
            statements.push(format!(
                "CREATE INDEX IF NOT EXISTS \"{table}_tenant_idx\" ON \"{table}\" ((body->>'tenantId'))"
            ));
        }

        for field in collection.unique_fields() {
            statements.push(format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS \"{}\" ON \"{table}\" ((body->>'{field}'))",
                unique_index_name(collection, field)
            ));
        }
    }

    statements
}

pub fn unique_index_name(collection: Collection, field: &str) -> String {
    format!("{}_{}_key", collection.name(), field)
}

/// Recover the document field from a unique index name produced by [`unique_index_name`].
pub fn field_for_unique_index(collection: Collection, index: &str) -> Option<&'static str> {
    collection
        .unique_fields()
        .iter()
        .copied()
        .find(|field| unique_index_name(collection, field) == index)
}
