use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "chronobond-cli")]
#[command(about = "Command-line client for the Chronobond API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Service health
    Health,
    /// List strategies and allowed lock-up periods
    Strategies,
    /// Fetch a swap quote (give exactly one of --input / --output)
    Quote {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        input: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Mint a bond
    Mint {
        #[arg(long)]
        account: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        lockup: u32,
        #[arg(long)]
        strategy: String,
        #[arg(long, default_value = "FLOW")]
        token: String,
    },
    /// Redeem one matured bond
    Redeem {
        #[arg(long)]
        account: String,
        #[arg(long)]
        bond: u64,
    },
    /// Redeem every matured bond of an account
    RedeemAll {
        #[arg(long)]
        account: String,
    },
    /// Offer a bond on the marketplace
    List {
        #[arg(long)]
        account: String,
        #[arg(long)]
        bond: u64,
        #[arg(long)]
        price: String,
    },
    /// Buy a listed bond
    Purchase {
        #[arg(long)]
        account: String,
        #[arg(long)]
        listing: u64,
    },
    /// Withdraw one of your listings
    Withdraw {
        #[arg(long)]
        account: String,
        #[arg(long)]
        listing: u64,
    },
    /// Split part of a bond's principal into a new bond
    Split {
        #[arg(long)]
        account: String,
        #[arg(long)]
        bond: u64,
        #[arg(long)]
        amount: String,
    },
    /// Show one operation's status
    Status { flow: String, key: String },
    /// Dismiss a finished operation's result
    Dismiss { flow: String, key: String },
    /// List an account's bonds
    Bonds {
        account: String,
        #[arg(long)]
        refresh: bool,
    },
    /// List marketplace offers
    Listings {
        #[arg(long)]
        refresh: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');
    let api = format!("{}/api/v1", base);

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Strategies => client.get(format!("{}/strategies", api)).send().await?,
        Commands::Quote {
            from,
            to,
            input,
            output,
        } => {
            let body = json!({
                "fromToken": from,
                "toToken": to,
                "fromTokenAmount": input,
                "toTokenAmount": output,
            });
            client.post(format!("{}/quote", api)).json(&body).send().await?
        }
        Commands::Mint {
            account,
            amount,
            lockup,
            strategy,
            token,
        } => {
            let body = json!({
                "account": account,
                "amount": amount,
                "lockupPeriod": lockup,
                "strategyID": strategy,
                "paymentToken": token,
            });
            client.post(format!("{}/mint", api)).json(&body).send().await?
        }
        Commands::Redeem { account, bond } => {
            let body = json!({ "account": account, "bondId": bond });
            client.post(format!("{}/redeem", api)).json(&body).send().await?
        }
        Commands::RedeemAll { account } => {
            let body = json!({ "account": account });
            client.post(format!("{}/redeem-all", api)).json(&body).send().await?
        }
        Commands::List {
            account,
            bond,
            price,
        } => {
            let body = json!({ "account": account, "bondId": bond, "price": price });
            client.post(format!("{}/marketplace/list", api)).json(&body).send().await?
        }
        Commands::Purchase { account, listing } => {
            let body = json!({ "account": account, "listingId": listing });
            client.post(format!("{}/marketplace/purchase", api)).json(&body).send().await?
        }
        Commands::Withdraw { account, listing } => {
            let body = json!({ "account": account, "listingId": listing });
            client.post(format!("{}/marketplace/withdraw", api)).json(&body).send().await?
        }
        Commands::Split {
            account,
            bond,
            amount,
        } => {
            let body = json!({ "account": account, "bondId": bond, "amount": amount });
            client.post(format!("{}/bonds/split", api)).json(&body).send().await?
        }
        Commands::Status { flow, key } => {
            client.get(format!("{}/status/{}/{}", api, flow, key)).send().await?
        }
        Commands::Dismiss { flow, key } => {
            client.delete(format!("{}/status/{}/{}", api, flow, key)).send().await?
        }
        Commands::Bonds { account, refresh } => {
            client
                .get(format!("{}/accounts/{}/bonds", api, account))
                .query(&[("refresh", refresh)])
                .send()
                .await?
        }
        Commands::Listings { refresh } => {
            client
                .get(format!("{}/listings", api))
                .query(&[("refresh", refresh)])
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
