// SQL used by the Postgres store. Column lists match the row types in `models`.

/// Named in `V1__initial_schema.sql`.
pub const ENTRY_PLAYER_FK: &str = "leaderboard_entries_player_fk";

pub const INSERT_LEADERBOARD: &str = "\
    INSERT INTO leaderboards (name, min_score, max_score, num_of_top_scores) \
    VALUES ($1, $2, $3, $4) \
    RETURNING id, name, min_score, max_score, num_of_top_scores, created_at";

pub const SELECT_LEADERBOARD: &str = "\
    SELECT id, name, min_score, max_score, num_of_top_scores, created_at \
    FROM leaderboards WHERE id = $1";

pub const SELECT_LEADERBOARDS: &str = "\
    SELECT id, name, min_score, max_score, num_of_top_scores, created_at \
    FROM leaderboards ORDER BY id";

pub const UPDATE_LEADERBOARD: &str = "\
    UPDATE leaderboards \
    SET name = $2, min_score = $3, max_score = $4, num_of_top_scores = $5 \
    WHERE id = $1";

pub const DELETE_LEADERBOARD: &str = "DELETE FROM leaderboards WHERE id = $1";

pub const INSERT_ENTRY: &str = "\
    INSERT INTO leaderboard_entries (leaderboard_id, player_id, score) \
    VALUES ($1, $2, $3) \
    RETURNING id, leaderboard_id, player_id, score, updated_at";

pub const UPDATE_ENTRY_SCORE: &str = "\
    UPDATE leaderboard_entries SET score = $2, updated_at = NOW() \
    WHERE id = $1";

pub const DELETE_ENTRY: &str = "DELETE FROM leaderboard_entries WHERE id = $1";

pub const SELECT_ENTRY_BY_ID: &str = "\
    SELECT id, leaderboard_id, player_id, score, updated_at \
    FROM leaderboard_entries WHERE id = $1";

pub const SELECT_ENTRY_BY_PLAYER: &str = "\
    SELECT id, leaderboard_id, player_id, score, updated_at \
    FROM leaderboard_entries WHERE leaderboard_id = $1 AND player_id = $2 \
    ORDER BY id LIMIT 1";

pub const SELECT_TOP_N: &str = "\
    SELECT id, leaderboard_id, player_id, score, updated_at \
    FROM leaderboard_entries WHERE leaderboard_id = $1 \
    ORDER BY score DESC LIMIT $2";

pub const SELECT_ENTRIES_AT_OR_ABOVE: &str = "\
    SELECT id, leaderboard_id, player_id, score, updated_at \
    FROM leaderboard_entries WHERE leaderboard_id = $1 AND score >= $2";

pub const UPSERT_PLAYER: &str = "\
    INSERT INTO players (id, username) VALUES ($1, $2) \
    ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username";

pub const SELECT_PLAYER_NAME: &str = "SELECT username FROM players WHERE id = $1";
