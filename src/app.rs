use std::env;

use actix_web::web::{self, scope, Data};
use lazy_static::lazy_static;
use log::{log, Level};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::endpoints::*;
use crate::schema::api::{
    AgendaDetailResponse, AgendaResponse, CommentResponse, LeaderDetailResponse, LeaderResponse,
    NewComment, Tally, VersionResponse, VoteSubmission,
};

pub struct AppState {
    pub db: Pool<Postgres>,
}

lazy_static! {
    pub static ref PERMISSIVE_CORS: bool = env::var("PERMISSIVE_CORS")
        .map(|x| x.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);
}

pub fn configure_app(cfg: &mut web::ServiceConfig) {
    let cors = if *PERMISSIVE_CORS {
        actix_cors::Cors::permissive()
    } else {
        actix_cors::Cors::default()
            .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
            .allow_any_method()
            .max_age(3600)
    };

    #[derive(OpenApi)]
    #[openapi(
        paths(
            create_comment,
            get_agenda,
            get_agenda_comments,
            get_agenda_leaderboard,
            get_agenda_votes,
            get_agendas,
            get_leader,
            get_leader_agendas,
            get_leader_comments,
            get_leader_votes,
            get_leaderboard,
            get_leaders,
            get_version,
            search_agendas,
            search_leaders,
            vote_agenda,
            vote_leader
        ),
        components(schemas(
            AgendaDetailResponse,
            AgendaResponse,
            CommentResponse,
            LeaderDetailResponse,
            LeaderResponse,
            NewComment,
            Tally,
            VersionResponse,
            VoteSubmission
        )),
        tags(
            (name = "Agora", description = "Civic engagement API")
        ),
    )]
    struct ApiDoc;

    let openapi = ApiDoc::openapi();

    cfg.service(SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", openapi))
        .service(
            scope("/api")
                .wrap(cors)
                // Literal segments register ahead of the /{id} captures.
                .service(get_leaderboard)
                .service(search_leaders)
                .service(get_leaders)
                .service(get_leader_votes)
                .service(vote_leader)
                .service(get_leader_agendas)
                .service(get_leader_comments)
                .service(get_leader)
                .service(get_agenda_leaderboard)
                .service(search_agendas)
                .service(get_agendas)
                .service(get_agenda_votes)
                .service(vote_agenda)
                .service(get_agenda_comments)
                .service(get_agenda)
                .service(create_comment)
                .service(get_version),
        );
}

pub async fn get_app_data() -> Data<AppState> {
    let db = PgPoolOptions::new()
        .connect(&env::var("DATABASE_URL").expect("DATABASE_URL not set"))
        .await
        .expect("Could not connect to database");
    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run migrations");
    log!(Level::Info, "Successfully connected to database");
    Data::new(AppState { db })
}
