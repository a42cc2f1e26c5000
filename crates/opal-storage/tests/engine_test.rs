//! End-to-end engine tests: catalog-routed CRUD, constraint enforcement,
//! tree shape under load, and whole-table persistence round-trips.

use std::collections::HashSet;
use std::io::Write;

use opal_common::{DataType, EngineConfig, OpalError, Value};
use opal_storage::{
    Catalog, ColumnDef, Command, CommandOutput, Comparator, Condition, KeyRole, Literal, Schema,
    SetClause, Table,
};

fn users_columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef {
            name: "id".to_string(),
            data_type: DataType::Int,
            nullable: false,
            key_role: KeyRole::Primary,
        },
        ColumnDef {
            name: "name".to_string(),
            data_type: DataType::Text,
            nullable: true,
            key_role: KeyRole::None,
        },
    ]
}

fn catalog_with_users() -> Catalog {
    let mut catalog = Catalog::new(EngineConfig::default());
    catalog
        .execute(Command::CreateTable {
            table: "t".to_string(),
            columns: users_columns(),
        })
        .unwrap();
    catalog
}

fn insert(catalog: &mut Catalog, id: i64, name: &str) -> CommandOutput {
    catalog
        .execute(Command::Insert {
            table: "t".to_string(),
            columns: vec![],
            values: vec![Literal::Integer(id), Literal::Text(name.to_string())],
        })
        .unwrap()
}

fn select_where_id(catalog: &mut Catalog, id: i64) -> Vec<Vec<Value>> {
    match catalog
        .execute(Command::Select {
            table: "t".to_string(),
            columns: vec![],
            condition: Some(Condition {
                column: "id".to_string(),
                comparator: Comparator::Eq,
                value: Literal::Integer(id),
                negated: false,
            }),
        })
        .unwrap()
    {
        CommandOutput::Rows { rows, .. } => rows,
        other => panic!("unexpected output {:?}", other),
    }
}

#[test]
fn crud_scenario() {
    // create t(id INT PRIMARY KEY, name TEXT); insert (1,"a"), (2,"b");
    // select * where id = 1 returns exactly [[1,"a"]].
    let mut catalog = catalog_with_users();
    assert_eq!(insert(&mut catalog, 1, "a"), CommandOutput::RowId(0));
    assert_eq!(insert(&mut catalog, 2, "b"), CommandOutput::RowId(1));

    let rows = select_where_id(&mut catalog, 1);
    assert_eq!(rows, vec![vec![Value::Int(1), Value::Text("a".to_string())]]);
}

#[test]
fn uniqueness_scenario() {
    let mut catalog = catalog_with_users();
    insert(&mut catalog, 1, "a");

    let err = catalog
        .execute(Command::Insert {
            table: "t".to_string(),
            columns: vec![],
            values: vec![Literal::Integer(1), Literal::Text("dup".to_string())],
        })
        .unwrap_err();
    assert!(matches!(err, OpalError::ConstraintViolation { .. }));

    // Row count unchanged.
    assert_eq!(catalog.table("t").unwrap().row_count(), 1);
}

#[test]
fn tombstone_scenario() {
    // Delete the sole row: select * comes back empty, the tombstone set
    // holds the id, and the id allocator does not rewind.
    let mut catalog = catalog_with_users();
    insert(&mut catalog, 1, "a");

    let out = catalog
        .execute(Command::Delete {
            table: "t".to_string(),
            condition: Some(Condition {
                column: "id".to_string(),
                comparator: Comparator::Eq,
                value: Literal::Integer(1),
                negated: false,
            }),
        })
        .unwrap();
    assert_eq!(out, CommandOutput::Affected(1));

    match catalog
        .execute(Command::Select {
            table: "t".to_string(),
            columns: vec![],
            condition: None,
        })
        .unwrap()
    {
        CommandOutput::Rows { rows, .. } => assert!(rows.is_empty()),
        other => panic!("unexpected output {:?}", other),
    }

    let table = catalog.table("t").unwrap();
    assert!(table.tombstones().contains(&0));
    assert_eq!(table.next_row_id(), 1);
}

#[test]
fn oversized_text_rejected_before_mutation() {
    let mut catalog = catalog_with_users();
    let err = catalog
        .execute(Command::Insert {
            table: "t".to_string(),
            columns: vec![],
            values: vec![Literal::Integer(1), Literal::Text("x".repeat(116))],
        })
        .unwrap_err();
    assert!(matches!(err, OpalError::ValueOutOfRange { .. }));
    assert_eq!(catalog.table("t").unwrap().row_count(), 0);
}

#[test]
fn fifty_row_tree_stays_in_bounds() {
    let config = EngineConfig::default();
    let mut table = Table::create("fifty", Schema::new(users_columns()), &config);
    for i in 0..50 {
        table
            .insert(&[], &[Literal::Integer(i), Literal::Text("r".to_string())])
            .unwrap();
    }
    assert_eq!(table.row_count(), 50);

    // Every probe-by-id still lands, and the full scan stays in id order.
    let ids: Vec<u32> = table.rows().map(|e| e.key).collect();
    assert_eq!(ids, (0..50).collect::<Vec<u32>>());
}

#[test]
fn update_then_select() {
    let mut catalog = catalog_with_users();
    insert(&mut catalog, 1, "a");
    insert(&mut catalog, 2, "b");

    let out = catalog
        .execute(Command::Update {
            table: "t".to_string(),
            set: SetClause {
                column: "name".to_string(),
                value: Literal::Text("renamed".to_string()),
            },
            condition: Some(Condition {
                column: "id".to_string(),
                comparator: Comparator::Eq,
                value: Literal::Integer(2),
                negated: false,
            }),
        })
        .unwrap();
    assert_eq!(out, CommandOutput::Affected(1));

    let rows = select_where_id(&mut catalog, 2);
    assert_eq!(
        rows,
        vec![vec![Value::Int(2), Value::Text("renamed".to_string())]]
    );
}

#[test]
fn indexed_condition_scenario() {
    let mut catalog = catalog_with_users();
    insert(&mut catalog, 1, "a");
    insert(&mut catalog, 2, "b");
    insert(&mut catalog, 3, "c");

    catalog
        .execute(Command::CreateIndex {
            table: "t".to_string(),
            column: "id".to_string(),
        })
        .unwrap();

    // Selects through the indexed column still answer correctly after
    // further writes force a rebuild.
    insert(&mut catalog, 4, "d");
    let rows = select_where_id(&mut catalog, 4);
    assert_eq!(rows, vec![vec![Value::Int(4), Value::Text("d".to_string())]]);
}

#[test]
fn two_hundred_row_persistence_roundtrip() {
    let config = EngineConfig::default();
    let mut table = Table::create("big", Schema::new(users_columns()), &config);
    for i in 0..200 {
        table
            .insert(
                &[],
                &[Literal::Integer(i), Literal::Text(format!("row{}", i))],
            )
            .unwrap();
    }

    // Write the page image through a real file, as the external persistence
    // layer would.
    let bytes = table.to_bytes();
    assert_eq!(bytes.len() % config.page_size, 0);

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    let read_back = std::fs::read(file.path()).unwrap();

    let reloaded = Table::from_bytes(
        &read_back,
        "big",
        table.schema().clone(),
        table.next_row_id(),
        &config,
    )
    .unwrap();
    assert_eq!(reloaded.row_count(), 200);
    assert_eq!(reloaded.next_row_id(), 200);

    // Compare as unordered sets of row tuples.
    let as_set = |t: &Table| -> HashSet<String> {
        let (_, rows) = t.select(&[], None).unwrap();
        rows.iter().map(|r| format!("{:?}", r)).collect()
    };
    assert_eq!(as_set(&table), as_set(&reloaded));
}

#[test]
fn reload_skips_interior_pages() {
    let config = EngineConfig::default();
    let mut table = Table::create("wide", Schema::new(users_columns()), &config);
    for i in 0..80 {
        table
            .insert(&[], &[Literal::Integer(i), Literal::Text("w".to_string())])
            .unwrap();
    }

    let bytes = table.to_bytes();
    let page_types: HashSet<u8> = bytes.chunks(config.page_size).map(|c| c[0]).collect();
    // A tree of this size writes both interior (5) and leaf (13) pages.
    assert!(page_types.contains(&5));
    assert!(page_types.contains(&13));

    let reloaded =
        Table::from_bytes(&bytes, "wide", table.schema().clone(), 80, &config).unwrap();
    assert_eq!(reloaded.row_count(), 80);
}

#[test]
fn catalog_error_contract() {
    let mut catalog = catalog_with_users();

    assert!(matches!(
        catalog.execute(Command::CreateTable {
            table: "t".to_string(),
            columns: users_columns(),
        }),
        Err(OpalError::TableAlreadyExists(_))
    ));
    assert!(matches!(
        catalog.execute(Command::Delete {
            table: "nope".to_string(),
            condition: None,
        }),
        Err(OpalError::TableNotFound(_))
    ));
    assert!(matches!(
        catalog.execute(Command::CreateIndex {
            table: "t".to_string(),
            column: "nope".to_string(),
        }),
        Err(OpalError::ColumnNotFound(_))
    ));
}
