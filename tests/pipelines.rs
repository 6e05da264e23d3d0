//! End-to-end pipelines: chains, diamonds, field paths, runtime inputs.

use std::collections::HashMap;

use weft::{use_run, use_task, Context, Extract, TaskResult, Weft};

#[derive(Clone, Extract)]
struct User {
    pub name: String,
    pub address: Address,
}

#[derive(Clone, Extract)]
struct Address {
    pub city: String,
}

fn sample_user() -> User {
    User {
        name: "ada".to_owned(),
        address: Address {
            city: "Chicago".to_owned(),
        },
    }
}

#[tokio::test]
async fn linear_chain_passes_results_downstream() {
    async fn a(_ctx: Context) -> TaskResult<i32> {
        Ok(1)
    }
    async fn b(_ctx: Context, x: i32) -> TaskResult<i32> {
        Ok(x + 10)
    }
    async fn c(_ctx: Context, y: i32) -> TaskResult<i32> {
        Ok(y * 3)
    }

    let flow = Weft::new();
    flow.add_task("A", a, [])
        .add_task("B", b, [use_task("A")])
        .add_task("C", c, [use_task("B")]);

    let results = flow.run(Context::new(), HashMap::new()).await.unwrap();
    assert_eq!(results.get("C").unwrap().downcast::<i32>(), Some(33));
}

#[tokio::test]
async fn diamond_joins_both_branches() {
    async fn root(_ctx: Context) -> TaskResult<i32> {
        Ok(10)
    }
    async fn left(_ctx: Context, v: i32) -> TaskResult<i32> {
        Ok(v * 2)
    }
    async fn right(_ctx: Context, v: i32) -> TaskResult<i32> {
        Ok(v * 3)
    }
    async fn join(_ctx: Context, a: i32, b: i32) -> TaskResult<i32> {
        Ok(a + b)
    }

    let flow = Weft::new();
    flow.add_task("root", root, [])
        .add_task("left", left, [use_task("root")])
        .add_task("right", right, [use_task("root")])
        .add_task("join", join, [use_task("left"), use_task("right")]);

    let results = flow.run(Context::new(), HashMap::new()).await.unwrap();
    assert_eq!(results.get("join").unwrap().downcast::<i32>(), Some(50));

    // Intermediate branch outputs stay observable in the store.
    assert_eq!(results.get("left").unwrap().downcast::<i32>(), Some(20));
    assert_eq!(results.get("right").unwrap().downcast::<i32>(), Some(30));
}

#[tokio::test]
async fn nested_field_extraction_feeds_a_consumer() {
    async fn fetch(_ctx: Context) -> TaskResult<User> {
        Ok(sample_user())
    }
    async fn consume(_ctx: Context, city: String) -> TaskResult<String> {
        Ok(format!("in {city}"))
    }

    let flow = Weft::new();
    flow.add_task("fetch", fetch, [])
        .add_task(
            "consume",
            consume,
            [use_task("fetch").field("address").field("city")],
        );

    let results = flow.run(Context::new(), HashMap::new()).await.unwrap();
    assert_eq!(
        results
            .get("consume")
            .unwrap()
            .downcast_ref::<String>()
            .map(String::as_str),
        Some("in Chicago")
    );
}

#[tokio::test]
async fn dotted_field_paths_are_equivalent() {
    async fn fetch(_ctx: Context) -> TaskResult<User> {
        Ok(sample_user())
    }
    async fn consume(_ctx: Context, city: String) -> TaskResult<String> {
        Ok(city)
    }

    let flow = Weft::new();
    flow.add_task("fetch", fetch, [])
        .add_task("consume", consume, [use_task("fetch").field("address.city")]);

    let results = flow.run(Context::new(), HashMap::new()).await.unwrap();
    assert_eq!(
        results
            .get("consume")
            .unwrap()
            .downcast_ref::<String>()
            .map(String::as_str),
        Some("Chicago")
    );
}

#[tokio::test]
async fn runtime_inputs_feed_tasks_and_support_field_paths() {
    async fn greet(_ctx: Context, name: String, city: String) -> TaskResult<String> {
        Ok(format!("{name} from {city}"))
    }

    let flow = Weft::new();
    flow.add_task(
        "greet",
        greet,
        [use_run("user").field("name"), use_run("user").field("address.city")],
    );

    let inputs = HashMap::from([("user".to_owned(), weft::Value::new(sample_user()))]);
    let results = flow.run(Context::new(), inputs).await.unwrap();
    assert_eq!(
        results
            .get("greet")
            .unwrap()
            .downcast_ref::<String>()
            .map(String::as_str),
        Some("ada from Chicago")
    );
}

#[tokio::test]
async fn task_output_overwrites_a_colliding_runtime_key() {
    async fn produce(_ctx: Context) -> TaskResult<i32> {
        Ok(2)
    }
    async fn consume(_ctx: Context, x: i32) -> TaskResult<i32> {
        Ok(x)
    }

    let flow = Weft::new();
    flow.add_task("x", produce, [])
        .add_task("reader", consume, [use_task("x")]);

    let inputs = HashMap::from([("x".to_owned(), weft::Value::new(1i32))]);
    let results = flow.run(Context::new(), inputs).await.unwrap();

    assert_eq!(results.get("reader").unwrap().downcast::<i32>(), Some(2));
    assert_eq!(results.get("x").unwrap().downcast::<i32>(), Some(2));
}

#[tokio::test]
async fn mixed_runtime_and_task_inputs() {
    async fn base(_ctx: Context) -> TaskResult<i32> {
        Ok(100)
    }
    async fn scale(_ctx: Context, base: i32, factor: i32) -> TaskResult<i32> {
        Ok(base * factor)
    }

    let flow = Weft::new();
    flow.add_task("base", base, [])
        .add_task("scale", scale, [use_task("base"), use_run("factor")]);

    let inputs = HashMap::from([("factor".to_owned(), weft::Value::new(3i32))]);
    let results = flow.run(Context::new(), inputs).await.unwrap();
    assert_eq!(results.get("scale").unwrap().downcast::<i32>(), Some(300));
}

#[tokio::test]
async fn context_values_are_visible_to_tasks() {
    async fn who(ctx: Context) -> TaskResult<String> {
        let tenant = ctx
            .value("tenant")
            .and_then(|v| v.downcast::<String>())
            .unwrap_or_default();
        Ok(tenant)
    }

    let flow = Weft::new();
    flow.add_task("who", who, []);

    let ctx = Context::new().with_value("tenant", weft::Value::new("acme".to_owned()));
    let results = flow.run(ctx, HashMap::new()).await.unwrap();
    assert_eq!(
        results
            .get("who")
            .unwrap()
            .downcast_ref::<String>()
            .map(String::as_str),
        Some("acme")
    );
}
