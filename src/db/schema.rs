diesel::table! {
    videos (id) {
        id -> Uuid,
        title -> Varchar,
        description -> Nullable<Text>,
        thumbnail_url -> Nullable<Text>,
        video_url -> Nullable<Text>,
        user_id -> Uuid,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}
