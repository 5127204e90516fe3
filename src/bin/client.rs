use std::str::FromStr;
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, Response};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "orders-client")]
#[command(about = "client cli used to manage orders on the server", version, long_about = None
)]
struct Cli {
    #[arg(long, default_value = DEFAULT_HOST, help = "Base url of the orders server")]
    host: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    /// order related ops
    #[command(arg_required_else_help = true)]
    Orders(OrdersArgs),
}

#[derive(Debug, Args)]
struct OrdersArgs {
    #[command(subcommand)]
    command: OrderCmds,
}

#[derive(Debug, Subcommand)]
enum OrderCmds {
    /// list every order with its items
    List,
    #[command(arg_required_else_help = true)]
    Get { id: i64 },
    #[command(arg_required_else_help = true)]
    Create {
        #[arg(long, help = "Name of the ordering customer.")]
        customer: String,
        #[arg(long = "item", help = "Item of the order, repeat for more.", value_name = "CODE:QTY[:DESCRIPTION]")]
        items: Vec<ItemSpec>,
    },
    #[command(arg_required_else_help = true)]
    Update {
        id: i64,
        #[arg(long, help = "New customer name.")]
        customer: Option<String>,
        #[arg(long = "item", help = "Item to overwrite (with ID=) or append.", value_name = "[ID=]CODE:QTY[:DESCRIPTION]")]
        items: Vec<ItemSpec>,
    },
    #[command(arg_required_else_help = true)]
    Delete { id: i64 },
}

const DEFAULT_HOST: &str = "http://localhost:8080";

/// Item given on the command line as `[ID=]CODE:QTY[:DESCRIPTION]`
#[derive(Debug, Clone, PartialEq, Serialize)]
struct ItemSpec {
    #[serde(rename = "line_item_id", skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    item_code: String,
    quantity: i64,
    description: String,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, rest) = match s.split_once('=') {
            Some((id, rest)) if !id.contains(':') => (Some(id.parse::<i64>().map_err(|e| format!("invalid item id {id}: {e}"))?), rest),
            _ => (None, s),
        };
        let mut parts = rest.splitn(3, ':');
        let item_code = match parts.next() {
            Some(code) if !code.is_empty() => code.to_string(),
            _ => return Err(format!("missing item code in {s}")),
        };
        let quantity = parts
            .next()
            .ok_or_else(|| format!("missing quantity in {s}"))?
            .parse::<i64>()
            .map_err(|e| format!("invalid quantity in {s}: {e}"))?;
        let description = parts.next().unwrap_or_default().to_string();

        Ok(Self {
            id,
            item_code,
            quantity,
            description,
        })
    }
}

async fn report(res: Response) -> Result<(), anyhow::Error> {
    let status = res.status();
    let body = res.json::<Value>().await.context("failed to read response body")?;
    if status.is_success() {
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        println!(
            "request failed with status {}, {}",
            status,
            body["message"].as_str().unwrap_or("no message")
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Cli::parse();
    let client = Client::new();
    let url = |path: String| format!("{}/{}", args.host.trim_end_matches('/'), path);

    let res = match args.command {
        Commands::Orders(orders) => match orders.command {
            OrderCmds::List => client.get(url("orders".to_string())).send().await?,
            OrderCmds::Get { id } => client.get(url(format!("orders/{id}"))).send().await?,
            OrderCmds::Create { customer, items } => {
                println!("creating order for customer={}", customer);
                client
                    .post(url("orders".to_string()))
                    .json(&json!({
                        "customer_name": customer,
                        "items": items,
                    }))
                    .send()
                    .await?
            }
            OrderCmds::Update { id, customer, items } => {
                println!("updating order={}", id);
                let mut body = serde_json::Map::new();
                if let Some(customer) = customer {
                    body.insert("customer_name".to_string(), json!(customer));
                }
                if !items.is_empty() {
                    body.insert("items".to_string(), json!(items));
                }
                client.put(url(format!("orders/{id}"))).json(&body).send().await?
            }
            OrderCmds::Delete { id } => {
                println!("deleting order={}", id);
                client.delete(url(format!("orders/{id}"))).send().await?
            }
        },
    };
    report(res).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_and_quantity() {
        let spec: ItemSpec = "A12B3C:10".parse().unwrap();
        assert_eq!(
            spec,
            ItemSpec {
                id: None,
                item_code: "A12B3C".to_string(),
                quantity: 10,
                description: String::new(),
            }
        );
    }

    #[test]
    fn description_keeps_colons() {
        let spec: ItemSpec = "5=A1:2:note: fragile".parse().unwrap();
        assert_eq!(spec.id, Some(5));
        assert_eq!(spec.description, "note: fragile");
        assert_eq!(serde_json::to_value(&spec).unwrap()["line_item_id"], 5);
    }

    #[test]
    fn rejects_incomplete_specs() {
        assert!("A1".parse::<ItemSpec>().is_err());
        assert!(":3".parse::<ItemSpec>().is_err());
        assert!("A1:many".parse::<ItemSpec>().is_err());
        assert!("x=A1:1".parse::<ItemSpec>().is_err());
    }

    #[test]
    fn equals_sign_in_description_is_not_an_id() {
        let spec: ItemSpec = "A1:1:size=XL".parse().unwrap();
        assert_eq!(spec.id, None);
        assert_eq!(spec.description, "size=XL");
    }

    #[test]
    fn unassigned_id_is_not_sent() {
        let spec: ItemSpec = "A1:1".parse().unwrap();
        assert!(serde_json::to_value(&spec).unwrap().get("line_item_id").is_none());
    }

    #[test]
    fn cli_parses_repeated_items() {
        let cli = Cli::parse_from(["client", "orders", "create", "--customer", "Budi", "--item", "A:1", "--item", "B:2:two"]);
        match cli.command {
            Commands::Orders(OrdersArgs { command: OrderCmds::Create { customer, items } }) => {
                assert_eq!(customer, "Budi");
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].description, "two");
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.host, DEFAULT_HOST);
    }
}
