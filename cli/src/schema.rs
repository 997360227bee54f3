// Subset of the server's schema covering the tables the CLI writes to.

diesel::table! {
    ingredients (id) {
        id -> Int4,
        #[max_length = 200]
        name -> Varchar,
        #[max_length = 200]
        measurement_unit -> Varchar,
    }
}

diesel::table! {
    tags (id) {
        id -> Int4,
        #[max_length = 200]
        name -> Varchar,
        #[max_length = 7]
        color -> Varchar,
        #[max_length = 200]
        slug -> Varchar,
    }
}

diesel::table! {
    users (id) {
        id -> Int4,
        #[max_length = 254]
        email -> Varchar,
        #[max_length = 150]
        username -> Varchar,
        #[max_length = 150]
        first_name -> Varchar,
        #[max_length = 150]
        last_name -> Varchar,
        #[max_length = 255]
        password_hash -> Varchar,
        is_staff -> Bool,
        date_joined -> Timestamptz,
    }
}
