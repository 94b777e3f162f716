//! P&C insurance schema model
//!
//! The fixed database the generated test queries run against. It is kept as
//! typed static data so the same definition can be rendered as the semantic
//! model embedded in SQL-generation prompts and as DDL for a sandbox
//! database.

/// Column data type, named as in the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Varchar,
    Date,
    TimestampNtz,
    Decimal,
}

impl DataType {
    pub fn warehouse_name(self) -> &'static str {
        match self {
            DataType::Varchar => "VARCHAR",
            DataType::Date => "DATE",
            DataType::TimestampNtz => "TIMESTAMP_NTZ",
            DataType::Decimal => "DECIMAL",
        }
    }

    /// PostgreSQL equivalent used by the sandbox DDL
    pub fn postgres_name(self) -> &'static str {
        match self {
            DataType::Varchar => "VARCHAR",
            DataType::Date => "DATE",
            DataType::TimestampNtz => "TIMESTAMP",
            DataType::Decimal => "NUMERIC(18, 2)",
        }
    }
}

/// Key role of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    None,
    Primary,
    /// Foreign key to `(table, column)`
    Foreign(&'static str, &'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub data_type: DataType,
    pub key: KeyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn primary_key(&self) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == KeyKind::Primary)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

const fn pk(name: &'static str) -> Column {
    Column {
        name,
        data_type: DataType::Varchar,
        key: KeyKind::Primary,
    }
}

const fn fk(name: &'static str, table: &'static str, column: &'static str) -> Column {
    Column {
        name,
        data_type: DataType::Varchar,
        key: KeyKind::Foreign(table, column),
    }
}

const fn col(name: &'static str, data_type: DataType) -> Column {
    Column {
        name,
        data_type,
        key: KeyKind::None,
    }
}

use DataType::{Date, Decimal, TimestampNtz, Varchar};

/// Name of the semantic model rendered into prompts
pub const MODEL_NAME: &str = "PC_Insurance_DB_SemanticModel";

/// Tables in dependency order: every foreign key points at an earlier table
pub const TABLES: &[Table] = &[
    Table {
        name: "Users",
        columns: &[pk("UserID"), col("UserName", Varchar), col("Role", Varchar)],
    },
    Table {
        name: "Customers",
        columns: &[
            pk("CustomerID"),
            col("CustomerType", Varchar),
            col("FirstName", Varchar),
            col("LastName", Varchar),
            col("CompanyName", Varchar),
            col("DateOfBirth", Date),
            col("AddressLine1", Varchar),
            col("City", Varchar),
            col("State", Varchar),
            col("ZipCode", Varchar),
            col("PhoneNumber", Varchar),
            col("EmailAddress", Varchar),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "Policies",
        columns: &[
            pk("PolicyID"),
            fk("CustomerID", "Customers", "CustomerID"),
            col("PolicyType", Varchar),
            col("EffectiveDate", Date),
            col("ExpirationDate", Date),
            col("Status", Varchar),
            col("TotalPremium", Decimal),
            fk("UnderwriterID", "Users", "UserID"),
            col("IssueDate", Date),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "PolicyCoverages",
        columns: &[
            pk("PolicyCoverageID"),
            fk("PolicyID", "Policies", "PolicyID"),
            col("CoverageType", Varchar),
            col("CoverageLimit", Decimal),
            col("Deductible", Decimal),
            col("PremiumForCoverage", Decimal),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "InsuredAssets",
        columns: &[
            pk("InsuredAssetID"),
            fk("PolicyID", "Policies", "PolicyID"),
            col("AssetType", Varchar),
            col("Description", Varchar),
            col("InsuredValue", Decimal),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "PolicyTransactions",
        columns: &[
            pk("PolicyTransactionID"),
            fk("PolicyID", "Policies", "PolicyID"),
            col("TransactionType", Varchar),
            col("TransactionDate", Date),
            col("EffectiveDate", Date),
            col("PremiumChangeAmount", Decimal),
            col("CreatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "BillingSchedules",
        columns: &[
            pk("BillingScheduleID"),
            fk("PolicyID", "Policies", "PolicyID"),
            col("DueDate", Date),
            col("AmountDue", Decimal),
            col("Status", Varchar),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "Claims",
        columns: &[
            pk("ClaimID"),
            fk("PolicyID", "Policies", "PolicyID"),
            fk("InsuredAssetID", "InsuredAssets", "InsuredAssetID"),
            col("DateOfLoss", TimestampNtz),
            col("DateReported", TimestampNtz),
            col("CauseOfLoss", Varchar),
            col("LossDescription", Varchar),
            col("Status", Varchar),
            fk("AssignedAdjusterID", "Users", "UserID"),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "Claimants",
        columns: &[
            pk("ClaimantID"),
            fk("ClaimID", "Claims", "ClaimID"),
            fk("CustomerID", "Customers", "CustomerID"),
            col("ClaimantType", Varchar),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "ClaimCoverages",
        columns: &[
            pk("ClaimCoverageID"),
            fk("ClaimID", "Claims", "ClaimID"),
            fk("PolicyCoverageID", "PolicyCoverages", "PolicyCoverageID"),
            col("Status", Varchar),
            col("CreatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "ClaimReserves",
        columns: &[
            pk("ClaimReserveID"),
            fk("ClaimID", "Claims", "ClaimID"),
            fk("PolicyCoverageID", "PolicyCoverages", "PolicyCoverageID"),
            col("ReserveType", Varchar),
            col("CurrentReserveAmount", Decimal),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "ClaimPayments",
        columns: &[
            pk("ClaimPaymentID"),
            fk("ClaimID", "Claims", "ClaimID"),
            fk("PolicyCoverageID", "PolicyCoverages", "PolicyCoverageID"),
            fk("ClaimantID", "Claimants", "ClaimantID"),
            col("PaymentAmount", Decimal),
            col("PaymentDate", Date),
            col("CreatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "ClaimSubrogations",
        columns: &[
            pk("SubrogationID"),
            fk("ClaimID", "Claims", "ClaimID"),
            col("AmountRecovered", Decimal),
            col("Status", Varchar),
            col("CreatedDate", TimestampNtz),
            col("LastUpdatedDate", TimestampNtz),
        ],
    },
    Table {
        name: "ClaimNotes",
        columns: &[
            pk("ClaimNoteID"),
            fk("ClaimID", "Claims", "ClaimID"),
            col("NoteText", Varchar),
            fk("CreatedByUserID", "Users", "UserID"),
            col("CreatedDate", TimestampNtz),
        ],
    },
];

pub fn table(name: &str) -> Option<&'static Table> {
    TABLES.iter().find(|t| t.name == name)
}

/// Renders the YAML semantic model embedded in SQL-generation prompts
pub fn semantic_model() -> String {
    let mut out = String::new();
    out.push_str("# Conceptual P&C Insurance Semantic Model (YAML)\n");
    out.push_str("version: 1\n");
    out.push_str("semantic_model:\n");
    out.push_str(&format!("  name: {}\n", MODEL_NAME));
    out.push_str("  description: Semantic model for the Property & Casualty Insurance database.\n");
    out.push_str("  tables:\n");

    for table in TABLES {
        out.push_str(&format!("    - name: {}\n", table.name));
        out.push_str("      columns:\n");
        for column in table.columns {
            out.push_str(&format!(
                "        - {{name: {}, data_type: {}",
                column.name,
                column.data_type.warehouse_name()
            ));
            match column.key {
                KeyKind::Primary => out.push_str(", is_primary_key: true"),
                KeyKind::Foreign(table, target) => {
                    out.push_str(&format!(
                        ", is_foreign_key: true, references: {}.{}",
                        table, target
                    ));
                }
                KeyKind::None => {}
            }
            out.push_str("}\n");
        }
    }

    out.trim_end().to_string()
}

/// Renders one `CREATE TABLE IF NOT EXISTS` statement per table
pub fn ddl_statements() -> Vec<String> {
    TABLES
        .iter()
        .map(|table| {
            let columns: Vec<String> = table
                .columns
                .iter()
                .map(|column| {
                    let mut line = format!("    {} {}", column.name, column.data_type.postgres_name());
                    match column.key {
                        KeyKind::Primary => line.push_str(" PRIMARY KEY"),
                        KeyKind::Foreign(target_table, target_column) => {
                            line.push_str(&format!(" REFERENCES {}({})", target_table, target_column));
                        }
                        KeyKind::None => {}
                    }
                    line
                })
                .collect();

            format!(
                "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
                table.name,
                columns.join(",\n")
            )
        })
        .collect()
}

/// All DDL statements as one script
pub fn ddl() -> String {
    ddl_statements()
        .into_iter()
        .map(|stmt| format!("{};", stmt))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_a_primary_key() {
        assert_eq!(TABLES.len(), 14);
        for table in TABLES {
            assert!(table.primary_key().is_some(), "{} has no primary key", table.name);
        }
    }

    #[test]
    fn test_foreign_keys_point_at_earlier_tables() {
        for (idx, table) in TABLES.iter().enumerate() {
            for column in table.columns {
                if let KeyKind::Foreign(target_table, target_column) = column.key {
                    let target_idx = TABLES
                        .iter()
                        .position(|t| t.name == target_table)
                        .unwrap_or_else(|| panic!("unknown table {}", target_table));
                    assert!(target_idx < idx, "{}.{} references a later table", table.name, column.name);
                    assert!(TABLES[target_idx].column(target_column).is_some());
                }
            }
        }
    }

    #[test]
    fn test_semantic_model_lines() {
        let model = semantic_model();
        assert!(model.starts_with("# Conceptual P&C Insurance Semantic Model (YAML)"));
        assert!(model.contains("  name: PC_Insurance_DB_SemanticModel"));
        assert!(model.contains("        - {name: UserID, data_type: VARCHAR, is_primary_key: true}"));
        assert!(model.contains(
            "        - {name: CustomerID, data_type: VARCHAR, is_foreign_key: true, references: Customers.CustomerID}"
        ));
        assert!(model.ends_with("- {name: CreatedDate, data_type: TIMESTAMP_NTZ}"));
    }

    #[test]
    fn test_semantic_model_table_block() {
        let expected = "    - name: Users\n      columns:\n        - {name: UserID, data_type: VARCHAR, is_primary_key: true}\n        - {name: UserName, data_type: VARCHAR}\n        - {name: Role, data_type: VARCHAR}\n    - name: Customers\n";
        assert!(semantic_model().contains(expected));
    }

    #[test]
    fn test_ddl_uses_postgres_types() {
        let statements = ddl_statements();
        assert_eq!(statements.len(), TABLES.len());

        let policies = &statements[2];
        assert!(policies.starts_with("CREATE TABLE IF NOT EXISTS Policies ("));
        assert!(policies.contains("PolicyID VARCHAR PRIMARY KEY"));
        assert!(policies.contains("CustomerID VARCHAR REFERENCES Customers(CustomerID)"));
        assert!(policies.contains("TotalPremium NUMERIC(18, 2)"));
        assert!(policies.contains("CreatedDate TIMESTAMP"));
        assert!(ddl().ends_with(");"));
    }

    #[test]
    fn test_table_lookup() {
        assert!(table("Claims").is_some());
        assert!(table("Orders").is_none());
    }
}
