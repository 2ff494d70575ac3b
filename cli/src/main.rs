use clap::{Parser, Subcommand};
use ringside::model::entity::{
    Course, CourseCreate, Lesson, LessonCreate, UserEntity, UserEntityCreate,
};
use ringside::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use ringside::web::AuthenticatedUser;
use ringside::{Config, error::AppResult};
use rust_decimal::Decimal;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },
}

/// User management
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

/// Course management
#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long)]
        description: String,
        /// Path to a Markdown file with the full description
        #[arg(long)]
        full_description_file: Option<String>,
        #[arg(long)]
        price: Decimal,
        /// beginner, intermediate or pro
        #[arg(long, default_value = "beginner")]
        level: String,
        #[arg(long, default_value = "boxing")]
        category: String,
        /// lifetime, monthly or yearly
        #[arg(long, default_value = "lifetime")]
        access_type: String,
        #[arg(long, default_value_t = 0)]
        duration_hours: i32,
        /// Repeat for every benefit
        #[arg(long)]
        benefit: Vec<String>,
        #[arg(long, default_value_t = false)]
        has_certificate: bool,
        /// Path relative to the uploads directory
        #[arg(long)]
        cover_image: Option<String>,
        #[arg(long)]
        banner_image: Option<String>,
    },
    /// Hide the course from the catalog
    Deactivate {
        #[arg(long)]
        slug: String,
    },
    /// Show a hidden course again
    Activate {
        #[arg(long)]
        slug: String,
    },
}

/// Lesson management
#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        /// Slug of the course to attach the lesson to
        #[arg(long)]
        course_slug: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: String,
        /// Appended after the last lesson when omitted
        #[arg(long)]
        order_index: Option<i32>,
        #[arg(long, default_value_t = false)]
        free_preview: bool,
        #[arg(long)]
        video_url: Option<String>,
        /// Path relative to the uploads directory
        #[arg(long)]
        video_file: Option<String>,
        /// 16:9, 9:16 or 1:1
        #[arg(long)]
        video_format: Option<String>,
        #[arg(long)]
        duration_minutes: Option<i32>,
        #[arg(long)]
        preview_duration_seconds: Option<i32>,
    },
}

async fn course_id_by_slug(mm: &ModelManager, slug: &str) -> AppResult<uuid::Uuid> {
    let id = sqlx::query_scalar("SELECT id FROM courses WHERE slug = $1")
        .bind(slug)
        .fetch_one(mm.executor())
        .await
        .map_err(DatabaseError::SqlxError)?;
    Ok(id)
}

async fn set_course_active(mm: &ModelManager, actor: &AuthenticatedUser, slug: &str, active: bool) -> AppResult<()> {
    let id = course_id_by_slug(mm, slug).await?;
    let course = Course::find_by_id(mm, actor, id)
        .await?
        .ok_or(DatabaseError::NotFound)?;
    let course = course.set_active(mm, actor, active).await?;
    println!("Course {} active: {}", course.slug(), course.is_active());
    Ok(())
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let database_uri = match std::env::var("DATABASE_URL") {
        Ok(uri) => uri,
        Err(_) => Config::get_or_init(true).await.app().database_uri().to_string(),
    };
    let db_con = DbConnection::connect(&database_uri)?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::system();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { email, password, first_name, last_name } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreate {
                        email,
                        first_name,
                        last_name,
                        password_hash: ringside::auth::hash_password(&password)?,
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add {
                title,
                slug,
                description,
                full_description_file,
                price,
                level,
                category,
                access_type,
                duration_hours,
                benefit,
                has_certificate,
                cover_image,
                banner_image,
            } => {
                let full_description = match full_description_file {
                    Some(path) => std::fs::read_to_string(path)?,
                    None => String::new(),
                };

                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        slug,
                        description,
                        full_description,
                        cover_image,
                        banner_image,
                        category,
                        level,
                        price,
                        access_type,
                        duration_hours,
                        benefits: benefit,
                        has_certificate,
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
            CourseCommands::Deactivate { slug } => {
                set_course_active(&mm, &actor, &slug, false).await?;
            }
            CourseCommands::Activate { slug } => {
                set_course_active(&mm, &actor, &slug, true).await?;
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                course_slug,
                title,
                file,
                order_index,
                free_preview,
                video_url,
                video_file,
                video_format,
                duration_minutes,
                preview_duration_seconds,
            } => {
                let course_id = course_id_by_slug(&mm, &course_slug).await?;
                let text_content = std::fs::read_to_string(file)?;

                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        course_id,
                        title,
                        order_index,
                        video_file,
                        video_url,
                        video_format,
                        duration_minutes,
                        text_content,
                        is_free_preview: free_preview,
                        preview_duration_seconds,
                        ..Default::default()
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },
    }

    Ok(())
}
