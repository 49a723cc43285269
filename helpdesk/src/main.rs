//! helpdesk - customer-support ticket inbox for the terminal
//!
//! Lists, searches and updates support tickets. Every change is written back
//! to the ticket slot in the local database right away.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/helpdesk/helpdesk.db (~/.local/share/helpdesk/helpdesk.db)
//! - Logs: $XDG_STATE_HOME/helpdesk/helpdesk.log.YYYY-MM-DD (one file per UTC day)
//! - Config: $XDG_CONFIG_HOME/helpdesk/config.toml (~/.config/helpdesk/config.toml)

mod render;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use helpdesk_core::format::format_duration;
use helpdesk_core::query::{
    filter_tickets, query_customers, query_users, AssigneeFilter, CustomerQuery, Filter,
    TicketQuery, TicketSort, UserQuery,
};
use helpdesk_core::stats::{
    user_workloads, CustomerStats, DashboardStats, TeamStats, TicketCounts,
};
use helpdesk_core::{
    Config, Database, Directory, DraftCustomer, NewCustomer, Priority, SlotStore, Ticket,
    TicketDraft, TicketId, TicketSource, TicketStatus, TicketStore, UserId,
};
use render::TicketRow;
use serde::Serialize;

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Customer-support ticket inbox")]
#[command(version)]
struct Args {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List tickets in the inbox
    List {
        /// Case-insensitive search over subject, customer name and email
        #[arg(short, long)]
        search: Option<String>,

        /// open, in_progress, resolved, closed or all
        #[arg(long, default_value = "all")]
        status: String,

        /// low, medium, high or all
        #[arg(long, default_value = "all")]
        priority: String,

        /// all, unassigned or a user id
        #[arg(long, default_value = "all")]
        assignee: String,

        /// created_at, updated_at, priority, status, subject or id (default: from config)
        #[arg(long)]
        sort: Option<String>,

        /// asc or desc (default: from config)
        #[arg(long)]
        order: Option<String>,
    },

    /// Show a ticket and its conversation
    Show {
        id: TicketId,
    },

    /// Open a new ticket
    Create {
        #[arg(long)]
        subject: String,

        /// The customer's first message
        #[arg(long)]
        message: String,

        #[arg(long, default_value = "medium")]
        priority: String,

        /// Existing customer id
        #[arg(long, conflicts_with_all = ["name", "email", "company", "phone"])]
        customer: Option<u64>,

        /// New customer name
        #[arg(long)]
        name: Option<String>,

        /// New customer email
        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        /// Assign to this user id
        #[arg(long)]
        assign: Option<UserId>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// Reply to a ticket as a team member
    Reply {
        id: TicketId,

        message: String,

        /// Author user id (default: inbox.agent_id from config)
        #[arg(long = "as")]
        author: Option<UserId>,
    },

    /// Change a ticket's status
    Status {
        id: TicketId,

        /// open, in_progress, resolved or closed
        status: String,
    },

    /// Assign a ticket to a user id, or "none" to unassign
    Assign {
        id: TicketId,

        user: String,
    },

    /// List customers
    Customers {
        #[arg(short, long)]
        search: Option<String>,

        /// name, email, company, tickets or created
        #[arg(long, default_value = "name")]
        sort: String,
    },

    /// List team members and their workload
    Users {
        #[arg(short, long)]
        search: Option<String>,

        /// admin, agent or all
        #[arg(long, default_value = "all")]
        role: String,

        /// online, away, offline or all
        #[arg(long, default_value = "all")]
        presence: String,
    },

    /// Dashboard numbers
    Stats,

    /// Discard saved tickets and go back to the sample data
    Reset,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging (to file only, stdout is for command output)
    let _log_guard =
        helpdesk_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("helpdesk starting");

    let db_path = config.resolved_database_path();
    tracing::info!(path = %db_path.display(), "Opening database");

    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    let mut store = TicketStore::open_with_key(&db, config.storage.tickets_key.as_str());
    let mut directory = Directory::seeded();

    if store.source() == TicketSource::Seed {
        tracing::debug!("No saved tickets, showing sample data");
    }

    let result = run(&args, &config, &mut store, &mut directory);
    warn_if_unsaved(&store);
    result
}

fn run<S: SlotStore>(
    args: &Args,
    config: &Config,
    store: &mut TicketStore<S>,
    directory: &mut Directory,
) -> Result<()> {
    let format = args.format;

    match &args.command {
        Command::List {
            search,
            status,
            priority,
            assignee,
            sort,
            order,
        } => {
            let sort = TicketSort::parse(
                sort.as_deref().unwrap_or(&config.inbox.sort),
                order.as_deref().unwrap_or(&config.inbox.order),
            )?;
            let mut query = TicketQuery::new().sorted(sort);
            query.search = search.clone();
            query.status = status.parse::<Filter<TicketStatus>>()?;
            query.priority = priority.parse::<Filter<Priority>>()?;
            query.assignee = assignee.parse::<AssigneeFilter>()?;
            cmd_list(format, store.tickets(), &query, directory)
        }
        Command::Show { id } => {
            let ticket = store.get(*id)?;
            print_ticket(format, ticket, directory)
        }
        Command::Create {
            subject,
            message,
            priority,
            customer,
            name,
            email,
            company,
            phone,
            assign,
            tags,
        } => {
            let customer = match customer {
                Some(id) => DraftCustomer::Existing(*id),
                None => DraftCustomer::New(NewCustomer {
                    name: name.clone().unwrap_or_default(),
                    email: email.clone().unwrap_or_default(),
                    company: company.clone(),
                    phone: phone.clone(),
                }),
            };

            let mut draft = TicketDraft::new(customer, subject.as_str(), message.as_str())
                .with_priority(priority.parse()?)
                .with_tags(tags);
            if let Some(user_id) = assign {
                require_user(directory, *user_id)?;
                draft = draft.assigned_to(*user_id);
            }

            let ticket = store.create(draft, directory)?;
            print_ticket(format, &ticket, directory)
        }
        Command::Reply {
            id,
            message,
            author,
        } => {
            let author = author.unwrap_or(config.inbox.agent_id);
            require_user(directory, author)?;
            let ticket = store.append_reply(*id, message, author)?;
            print_ticket(format, &ticket, directory)
        }
        Command::Status { id, status } => {
            let ticket = store.set_status(*id, status.parse()?)?;
            print_ticket(format, &ticket, directory)
        }
        Command::Assign { id, user } => {
            let assignee = match user.as_str() {
                "none" => None,
                other => {
                    let user_id: UserId = other
                        .parse()
                        .with_context(|| format!("invalid user id: {}", other))?;
                    require_user(directory, user_id)?;
                    Some(user_id)
                }
            };
            let ticket = store.set_assignee(*id, assignee)?;
            print_ticket(format, &ticket, directory)
        }
        Command::Customers { search, sort } => {
            let query = CustomerQuery {
                search: search.clone(),
                sort: sort.parse()?,
            };
            cmd_customers(format, &query, directory)
        }
        Command::Users {
            search,
            role,
            presence,
        } => {
            let query = UserQuery {
                search: search.clone(),
                role: role.parse()?,
                presence: presence.parse()?,
            };
            cmd_users(format, &query, store.tickets(), directory)
        }
        Command::Stats => cmd_stats(format, store.tickets(), directory),
        Command::Reset => {
            store.reset();
            if format == OutputFormat::Json {
                print_json(store.tickets())
            } else {
                println!("Reset to {} sample tickets", store.tickets().len());
                Ok(())
            }
        }
    }
}

fn cmd_list(
    format: OutputFormat,
    tickets: &[Ticket],
    query: &TicketQuery,
    directory: &Directory,
) -> Result<()> {
    let matched = filter_tickets(tickets, query, directory);

    if format == OutputFormat::Json {
        return print_json(&matched);
    }

    println!("{}", render::status_tabs(&TicketCounts::from_tickets(tickets)));
    println!();

    if matched.is_empty() {
        println!("No tickets match");
        return Ok(());
    }

    let now = Utc::now();
    println!("{}", render::header());
    for ticket in matched {
        println!("{}", TicketRow::new(ticket, directory).line(now));
    }
    Ok(())
}

fn cmd_customers(format: OutputFormat, query: &CustomerQuery, directory: &Directory) -> Result<()> {
    let customers = query_customers(directory.customers(), query);

    if format == OutputFormat::Json {
        return print_json(&customers);
    }

    let stats = CustomerStats::from_customers(directory.customers());
    println!(
        "{} customers, {} with tickets, {:.1} tickets on average",
        stats.total, stats.with_tickets, stats.average_tickets
    );
    println!();
    for customer in customers {
        println!(
            "{:<5} {:<48} {:>3} tickets  since {}",
            customer.id,
            render::customer_line(customer),
            customer.total_tickets,
            customer.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn cmd_users(
    format: OutputFormat,
    query: &UserQuery,
    tickets: &[Ticket],
    directory: &Directory,
) -> Result<()> {
    let matched: Vec<UserId> = query_users(directory.users(), query)
        .iter()
        .map(|u| u.id)
        .collect();
    let workloads: Vec<_> = user_workloads(directory.users(), tickets)
        .into_iter()
        .filter(|w| matched.contains(&w.user.id))
        .collect();

    if format == OutputFormat::Json {
        return print_json(&workloads);
    }

    let team = TeamStats::from_users(directory.users());
    println!(
        "{} members, {} online, {} admins, {} agents",
        team.total, team.online, team.admins, team.agents
    );
    println!();
    for workload in &workloads {
        println!("{}", render::workload_line(workload));
    }
    Ok(())
}

#[derive(Serialize)]
struct StatsReport {
    dashboard: DashboardStats,
    customers: CustomerStats,
    team: TeamStats,
}

fn cmd_stats(format: OutputFormat, tickets: &[Ticket], directory: &Directory) -> Result<()> {
    let report = StatsReport {
        dashboard: DashboardStats::compute(tickets, Utc::now()),
        customers: CustomerStats::from_customers(directory.customers()),
        team: TeamStats::from_users(directory.users()),
    };

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    let dashboard = &report.dashboard;
    println!("Tickets:        {}", render::status_tabs(&dashboard.counts));
    println!("Created today:  {}", dashboard.created_today);
    println!("This week:      {}", dashboard.created_this_week);
    println!(
        "First response: {}",
        dashboard
            .avg_first_response_secs
            .map(format_duration)
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "Customers:      {} ({} with tickets)",
        report.customers.total, report.customers.with_tickets
    );
    println!(
        "Team:           {} ({} online)",
        report.team.total, report.team.online
    );

    if !dashboard.needs_assignment.is_empty() {
        println!();
        println!("Needs assignment:");
        for id in &dashboard.needs_assignment {
            if let Some(ticket) = tickets.iter().find(|t| t.id == *id) {
                println!("  #{} {}", ticket.id, ticket.subject);
            }
        }
    }
    Ok(())
}

fn print_ticket(format: OutputFormat, ticket: &Ticket, directory: &Directory) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(ticket);
    }
    print!("{}", render::ticket_detail(ticket, directory));
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to encode output")?;
    println!("{}", json);
    Ok(())
}

fn require_user(directory: &Directory, id: UserId) -> Result<()> {
    if directory.user(id).is_none() {
        bail!("unknown team member: {}", id);
    }
    Ok(())
}

/// The change is kept for this run but did not reach the database.
fn warn_if_unsaved<S: SlotStore>(store: &TicketStore<S>) {
    if let Some(error) = store.persistence_error() {
        tracing::warn!(error = %error, "Ticket slot not in sync");
        eprintln!("warning: {}", error);
    }
}
