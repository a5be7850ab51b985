diesel::table! {
    campaigns (id) {
        id -> Uuid,
        title -> Text,
        consultant_id -> Uuid,
        status -> Text,
        templates -> Jsonb,
        recipients -> Jsonb,
        total_recipients -> Int4,
        sent_count -> Int4,
        failed_count -> Int4,
        pending_count -> Int4,
        cursor -> Int4,
        interval_seconds -> Int4,
        pause_every -> Int4,
        pause_minutes -> Int4,
        randomize_order -> Bool,
        skip_duplicates -> Bool,
        use_variables -> Bool,
        keep_history -> Bool,
        notify_on_completion -> Bool,
        estimated_minutes -> Int4,
        created_at -> Timestamptz,
        started_at -> Nullable<Timestamptz>,
        ended_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    campaign_log_entries (id) {
        id -> Uuid,
        campaign_id -> Uuid,
        lead_id -> Nullable<Uuid>,
        recipient_name -> Text,
        phone -> Text,
        status -> Text,
        rendered_message -> Nullable<Text>,
        template_index -> Nullable<Int4>,
        error -> Nullable<Text>,
        sent_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
    }
}

diesel::joinable!(campaign_log_entries -> campaigns (campaign_id));

diesel::allow_tables_to_appear_in_same_query!(campaigns, campaign_log_entries);
