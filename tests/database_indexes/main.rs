
use std::collections::BTreeSet;

use partial_unique::{
    Config, Database, Model, Registry, Transaction, conditional_indexes,
    find_models_with_unique_together_nullable_fields,
};
use schema::*;

const END_TIME: i64 = 1_600_000_000;

struct Fixture {
    realm: i64,
    user: i64,
    stream: i64,
    server: i64,
}

fn fixture(txn: &Transaction<Zulip>) -> Fixture {
    let realm = txn
        .insert(&Realm {
            string_id: "zulip".to_owned(),
            name: "Zulip Dev".to_owned(),
        })
        .unwrap();
    let user = txn
        .insert(&UserProfile {
            realm,
            email: "othello@zulip.com".to_owned(),
            full_name: "Othello, the Moor of Venice".to_owned(),
        })
        .unwrap();
    let stream = txn
        .insert(&Stream {
            realm,
            name: "Verona".to_owned(),
            description: None,
        })
        .unwrap();
    let server = txn
        .insert(&RemoteZulipServer {
            uuid: "1234-abcd".to_owned(),
            api_key: "magic_secret_api_key".to_owned(),
            hostname: "demo.example.com".to_owned(),
            last_updated: END_TIME,
        })
        .unwrap();
    Fixture {
        realm,
        user,
        stream,
        server,
    }
}

fn open_db() -> Database<Zulip> {
    let db = Database::new(Config::open_in_memory()).unwrap();
    db.create_conditional_indexes().unwrap();
    db
}

/// Insert `row` and check that inserting it again is rejected.
fn assert_duplicate_rejected<M: Model<Registry = Zulip>>(
    txn: &mut Transaction<Zulip>,
    row: &M,
    tested: &mut BTreeSet<&'static str>,
) {
    txn.insert(row).unwrap();
    let err = txn.atomic(|txn| txn.insert(row)).unwrap_err();
    assert!(err.is_unique_violation(), "{}: {err}", M::META.name);
    // the failed insert did not break the outer transaction
    assert_eq!(txn.count::<M>().unwrap(), 1);
    tested.insert(M::META.name);
}

#[test]
fn models_with_nullable_fields_in_unique_together_constraints() {
    let mut db = open_db();
    let mut txn = db.transaction().unwrap();
    let f = fixture(&txn);
    let mut tested = BTreeSet::new();

    let installation_count = InstallationCount {
        property: "test".to_owned(),
        subgroup: None,
        end_time: END_TIME,
        value: 10,
    };
    assert_duplicate_rejected(&mut txn, &installation_count, &mut tested);

    let realm_count = RealmCount {
        realm: f.realm,
        property: "test".to_owned(),
        subgroup: None,
        end_time: END_TIME,
        value: 10,
    };
    assert_duplicate_rejected(&mut txn, &realm_count, &mut tested);

    let user_count = UserCount {
        user: f.user,
        realm: f.realm,
        property: "test".to_owned(),
        subgroup: None,
        end_time: END_TIME,
        value: 10,
    };
    assert_duplicate_rejected(&mut txn, &user_count, &mut tested);

    let stream_count = StreamCount {
        stream: f.stream,
        realm: f.realm,
        property: "test".to_owned(),
        subgroup: None,
        end_time: END_TIME,
        value: 10,
    };
    assert_duplicate_rejected(&mut txn, &stream_count, &mut tested);

    let remote_installation_count = RemoteInstallationCount {
        server: f.server,
        remote_id: 1,
        property: "test".to_owned(),
        subgroup: None,
        end_time: END_TIME,
        value: 10,
    };
    assert_duplicate_rejected(&mut txn, &remote_installation_count, &mut tested);

    let remote_realm_count = RemoteRealmCount {
        server: f.server,
        realm_id: 1,
        remote_id: 1,
        property: "test".to_owned(),
        subgroup: None,
        end_time: END_TIME,
        value: 10,
    };
    assert_duplicate_rejected(&mut txn, &remote_realm_count, &mut tested);

    // Adding a model with a nullable field in a unique-together constraint
    // requires adding a case above.
    let to_test = find_models_with_unique_together_nullable_fields(Zulip::MODELS);
    assert_eq!(tested, to_test);
}

#[test]
fn one_conditional_index_per_model() {
    let mut db = open_db();
    let txn = db.transaction().unwrap();

    fn partial<M: Model<Registry = Zulip>>(txn: &Transaction<Zulip>) -> Vec<(String, Vec<String>)> {
        txn.indexes::<M>()
            .unwrap()
            .into_iter()
            .filter(|index| index.partial)
            .inspect(|index| assert!(index.unique))
            .map(|index| (index.name, index.columns))
            .collect()
    }

    expect_test::expect![[r#"
        [
            [
                (
                    "property_end_time_uniq",
                    [
                        "property",
                        "end_time",
                    ],
                ),
            ],
            [
                (
                    "realm_id_property_end_time_uniq",
                    [
                        "realm_id",
                        "property",
                        "end_time",
                    ],
                ),
            ],
            [
                (
                    "user_id_property_end_time_uniq",
                    [
                        "user_id",
                        "property",
                        "end_time",
                    ],
                ),
            ],
            [
                (
                    "stream_id_property_end_time_uniq",
                    [
                        "stream_id",
                        "property",
                        "end_time",
                    ],
                ),
            ],
            [
                (
                    "server_id_property_end_time_uniq",
                    [
                        "server_id",
                        "property",
                        "end_time",
                    ],
                ),
            ],
            [
                (
                    "server_id_realm_id_property_end_time_uniq",
                    [
                        "server_id",
                        "realm_id",
                        "property",
                        "end_time",
                    ],
                ),
            ],
        ]
    "#]]
    .assert_debug_eq(&[
        partial::<InstallationCount>(&txn),
        partial::<RealmCount>(&txn),
        partial::<UserCount>(&txn),
        partial::<StreamCount>(&txn),
        partial::<RemoteInstallationCount>(&txn),
        partial::<RemoteRealmCount>(&txn),
    ]);

    assert!(partial::<Realm>(&txn).is_empty());
    assert!(partial::<UserProfile>(&txn).is_empty());
    assert!(partial::<Stream>(&txn).is_empty());
    assert!(partial::<UserActivity>(&txn).is_empty());
    assert!(partial::<RemoteZulipServer>(&txn).is_empty());
}

#[test]
fn conditional_indexes_match_created_indexes() {
    let db = open_db();
    let schema = db.schema().unwrap();
    let expected = conditional_indexes(Zulip::MODELS).unwrap();
    assert_eq!(expected.len(), 6);
    for index in expected {
        assert!(schema.contains(&index.to_sql()), "missing {}", index.name);
    }
}

#[test]
fn nullable_field_can_differ() {
    let mut db = open_db();
    let mut txn = db.transaction().unwrap();
    let f = fixture(&txn);

    let row = |subgroup: Option<&str>| RealmCount {
        realm: f.realm,
        property: "messages_sent:is_bot:hour".to_owned(),
        subgroup: subgroup.map(str::to_owned),
        end_time: END_TIME,
        value: 1,
    };

    txn.insert(&row(None)).unwrap();
    txn.insert(&row(Some("false"))).unwrap();
    txn.insert(&row(Some("true"))).unwrap();
    assert_eq!(txn.count::<RealmCount>().unwrap(), 3);

    // the normal unique constraint still applies to non-null values
    let err = txn.atomic(|txn| txn.insert(&row(Some("true")))).unwrap_err();
    assert!(err.is_unique_violation(), "{err}");

    // and rows that differ in a non-null column are fine
    let mut other = row(None);
    other.end_time += 3600;
    txn.insert(&other).unwrap();
    assert_eq!(txn.count::<RealmCount>().unwrap(), 4);
}

#[test]
fn null_duplicates_without_conditional_indexes() {
    let mut db = Database::<Zulip>::new(Config::open_in_memory()).unwrap();
    let txn = db.transaction().unwrap();

    let row = InstallationCount {
        property: "active_users:is_bot:day".to_owned(),
        subgroup: None,
        end_time: END_TIME,
        value: 10,
    };
    txn.insert(&row).unwrap();
    txn.insert(&row).unwrap();
    assert_eq!(txn.count::<InstallationCount>().unwrap(), 2);
}
