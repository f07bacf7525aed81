use redb::TableDefinition;

/// Token metadata: "current" -> TokenSnapshot (bincode)
pub const TOKEN_META: TableDefinition<&str, &[u8]> = TableDefinition::new("token_meta");
