mod support;

use std::sync::Arc;

use marquee_core::database::{CreditRepository, InMemoryCatalog};
use marquee_core::sync::CreditExpander;
use marquee_model::{Credit, CreditId, CreditKind, MovieId, PersonId};
use support::{FixtureTransport, client, movie_credits, register_credit};

const RESUMED: &str = "52fe4250c3a36847f80149f3";

fn expander(
    transport: &Arc<FixtureTransport>,
    catalog: &InMemoryCatalog,
) -> CreditExpander {
    CreditExpander::new(client(transport.clone()), Arc::new(catalog.clone()))
}

#[tokio::test]
async fn stored_credit_is_skipped_without_network() -> anyhow::Result<()> {
    let transport = Arc::new(FixtureTransport::new());
    transport.json(
        "/movie/603/credits",
        movie_credits(&[(RESUMED, 6384), ("c-603-b", 2975)], &[]),
    );
    register_credit(&transport, RESUMED, "cast", 6384);
    register_credit(&transport, "c-603-b", "cast", 2975);

    let catalog = InMemoryCatalog::new();
    catalog
        .create_credit(&Credit {
            id: CreditId::new(RESUMED),
            movie_id: MovieId(603),
            person_id: PersonId(6384),
            kind: CreditKind::Cast,
            department: "Acting".into(),
            job: "Actor".into(),
            character: Some("Neo".into()),
            order: 0,
        })
        .await?;

    let report = expander(&transport, &catalog).expand(MovieId(603)).await?;

    assert_eq!(report.skipped, 1);
    assert_eq!(report.inserted, 1);
    assert_eq!(transport.request_count(&format!("/credit/{RESUMED}")), 0);
    assert_eq!(transport.request_count("/person/6384"), 0);
    assert_eq!(transport.request_count("/credit/c-603-b"), 1);
    Ok(())
}

#[tokio::test]
async fn one_bad_credit_does_not_block_its_siblings() -> anyhow::Result<()> {
    let transport = Arc::new(FixtureTransport::new());
    let ids = ["c-0", "c-1", "c-2", "c-3", "c-4"];
    let cast: Vec<(&str, i64)> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| (*id, 700 + index as i64))
        .collect();
    transport.json("/movie/1/credits", movie_credits(&cast, &[]));
    for (id, person) in &cast {
        register_credit(&transport, id, "cast", *person);
    }
    transport.raw("/credit/c-2", 200, r#"{"id": "c-2", "credit_type": 7"#);

    let catalog = InMemoryCatalog::new();
    let report = expander(&transport, &catalog).expand(MovieId(1)).await?;

    assert_eq!(report.inserted, 4);
    assert_eq!(report.failed, 1);

    let stored = catalog.credits_for(MovieId(1)).await;
    let orders: Vec<(String, i32)> = stored
        .iter()
        .map(|credit| (credit.id.to_string(), credit.order))
        .collect();
    assert_eq!(
        orders,
        vec![
            ("c-0".to_string(), 0),
            ("c-1".to_string(), 1),
            ("c-3".to_string(), 3),
            ("c-4".to_string(), 4),
        ]
    );
    // The failed credit's person is never fetched.
    assert_eq!(transport.request_count("/person/702"), 0);

    // A later run picks up only the credit that failed.
    register_credit(&transport, "c-2", "cast", 702);
    transport.clear_requests();
    let retry = expander(&transport, &catalog).expand(MovieId(1)).await?;
    assert_eq!((retry.inserted, retry.skipped), (1, 4));
    assert_eq!(transport.request_count("/credit/c-0"), 0);
    Ok(())
}

#[tokio::test]
async fn crew_is_processed_before_cast_with_separate_indices()
-> anyhow::Result<()> {
    let transport = Arc::new(FixtureTransport::new());
    transport.json(
        "/movie/5/credits",
        movie_credits(
            &[("cast-a", 1), ("cast-b", 2)],
            &[("crew-a", 3), ("crew-b", 1)],
        ),
    );
    register_credit(&transport, "cast-a", "cast", 1);
    register_credit(&transport, "cast-b", "cast", 2);
    register_credit(&transport, "crew-a", "crew", 3);
    register_credit(&transport, "crew-b", "crew", 1);

    let catalog = InMemoryCatalog::new();
    let report = expander(&transport, &catalog).expand(MovieId(5)).await?;

    assert_eq!(report.inserted, 4);
    // Person 1 appears in both lists but is fetched once.
    assert_eq!(report.people_created, 3);
    assert_eq!(transport.request_count("/person/1"), 1);

    let credit_paths: Vec<String> = transport
        .requests()
        .into_iter()
        .map(|request| request.path)
        .filter(|path| path.starts_with("/credit/"))
        .collect();
    assert_eq!(
        credit_paths,
        vec![
            "/credit/crew-a",
            "/credit/crew-b",
            "/credit/cast-a",
            "/credit/cast-b"
        ]
    );

    let stored = catalog.credits_for(MovieId(5)).await;
    let crew_b = stored
        .iter()
        .find(|credit| credit.id.as_str() == "crew-b")
        .expect("crew-b stored");
    assert_eq!(crew_b.kind, CreditKind::Crew);
    assert_eq!(crew_b.order, 1);
    assert_eq!(crew_b.job, "Director");
    assert_eq!(crew_b.character, None);

    let person = catalog.person(PersonId(1)).await.expect("person stored");
    assert_eq!(person.name, "Person 1");
    Ok(())
}

#[tokio::test]
async fn missing_credit_list_is_an_error() {
    let transport = Arc::new(FixtureTransport::new());
    let catalog = InMemoryCatalog::new();

    let err = expander(&transport, &catalog)
        .expand(MovieId(404))
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), Some(404));
}
